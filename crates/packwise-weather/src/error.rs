//! Weather resolution error types.

use thiserror::Error;

/// Errors raised by the providers and the resolver setup.
///
/// Only `Configuration` ever reaches callers of the resolver; every other
/// variant is absorbed and turned into the fallback estimate.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No usable data: {0}")]
    NoUsableData(String),
}

impl WeatherError {
    /// Whether this error describes provider flakiness rather than a
    /// misconfigured host.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Weather service is not configured. Check your API keys.",
            Self::Network(_) => "Unable to reach the weather service.",
            Self::Status { status, .. } if *status == 401 || *status == 403 => {
                "Weather service rejected the API key."
            }
            Self::Status { .. } => "Weather service returned an error.",
            Self::Parse(_) => "Weather service sent an unexpected response.",
            Self::NoUsableData(_) => "No weather data is available for this destination.",
        }
    }
}
