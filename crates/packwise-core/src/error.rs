//! Centralized error types for Packwise.
//!
//! Every error carries a `user_message()` suitable for showing to travellers;
//! the `Display` form keeps the full detail for logs.

use thiserror::Error;

pub use packwise_weather::WeatherError;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => {
                "Weather API keys are missing. Add them to config.toml or the environment."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Config(ConfigError::MissingSetting("weather.meteostat_api_key".into())),
            AppError::Weather(WeatherError::NoUsableData("empty".into())),
            AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
            AppError::Other(anyhow::anyhow!("boom")),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "{err}");
        }
    }

    #[test]
    fn test_weather_error_conversion() {
        let app_err: AppError = WeatherError::Configuration("no keys".into()).into();
        assert!(matches!(
            app_err,
            AppError::Weather(WeatherError::Configuration(_))
        ));
        assert_eq!(
            app_err.user_message(),
            "Weather service is not configured. Check your API keys."
        );
    }

    #[test]
    fn test_config_error_propagation() {
        let app_err: AppError = ConfigError::ParseError("line 3".into()).into();
        assert_eq!(
            app_err.user_message(),
            "Configuration file is malformed. Check your settings."
        );
        assert!(app_err.to_string().contains("line 3"));
    }
}
