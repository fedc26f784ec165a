pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::{Config, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, WeatherError};

use anyhow::Result;

/// Initialize logging. `RUST_LOG` overrides the default `info` filter.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!("Packwise core initialized");
    Ok(())
}
