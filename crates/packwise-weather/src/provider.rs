//! Provider seams and the shared HTTP plumbing used by the concrete clients.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::WeatherError;
use crate::types::{CurrentConditions, DailyForecast, ForecastPoint, GeoPoint, MonthlyClimate};

pub(crate) const USER_AGENT: &str = concat!("Packwise/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Short-range provider offering current conditions and an interval forecast.
#[async_trait]
pub trait NearTermProvider: Send + Sync {
    /// Identifier stored in `WeatherEstimate::source`
    fn name(&self) -> &str;

    fn attribution(&self) -> &str;

    /// Number of forecast slots per day (8 for a 3-hour forecast)
    fn points_per_day(&self) -> u32 {
        8
    }

    async fn current_conditions(&self, point: GeoPoint) -> Result<CurrentConditions, WeatherError>;

    async fn short_range_forecast(&self, point: GeoPoint) -> Result<Vec<ForecastPoint>, WeatherError>;
}

/// Daily forecast provider covering up to two weeks.
#[async_trait]
pub trait MediumTermProvider: Send + Sync {
    fn name(&self) -> &str;

    fn attribution(&self) -> &str;

    async fn daily_forecast(
        &self,
        point: GeoPoint,
        days_ahead: u32,
    ) -> Result<Vec<DailyForecast>, WeatherError>;
}

/// Historical monthly climate aggregates.
#[async_trait]
pub trait ClimateProvider: Send + Sync {
    fn attribution(&self) -> &str;

    async fn monthly_history(
        &self,
        point: GeoPoint,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthlyClimate>, WeatherError>;
}

/// API keys for the three providers, supplied by the host application.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub openweathermap: String,
    pub weatherapi: String,
    pub meteostat: String,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("openweathermap", &redact(&self.openweathermap))
            .field("weatherapi", &redact(&self.weatherapi))
            .field("meteostat", &redact(&self.meteostat))
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() {
        "<missing>"
    } else {
        "<redacted>"
    }
}

impl ProviderCredentials {
    pub fn new(
        openweathermap: impl Into<String>,
        weatherapi: impl Into<String>,
        meteostat: impl Into<String>,
    ) -> Self {
        Self {
            openweathermap: openweathermap.into(),
            weatherapi: weatherapi.into(),
            meteostat: meteostat.into(),
        }
    }

    /// Reject blank or placeholder keys.
    pub fn validate(&self) -> Result<(), WeatherError> {
        let missing: Vec<&str> = [
            ("openweathermap", &self.openweathermap),
            ("weatherapi", &self.weatherapi),
            ("meteostat", &self.meteostat),
        ]
        .into_iter()
        .filter(|(_, key)| !is_usable_key(key))
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(WeatherError::Configuration(format!(
                "missing or placeholder API key for: {}",
                missing.join(", ")
            )))
        }
    }
}

/// A key is usable when it is non-blank and not a `YOUR_...` placeholder.
pub fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.starts_with("YOUR_")
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Check the status and decode a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: Response,
) -> Result<T, WeatherError> {
    let status = response.status();
    if !status.is_success() {
        tracing::debug!("{} responded with {}", provider, status);
        return Err(WeatherError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    if body.is_empty() {
        return Err(WeatherError::Parse(format!("{provider} returned an empty body")));
    }

    serde_json::from_slice(&body)
        .map_err(|e| WeatherError::Parse(format!("{provider} response: {e}")))
}
