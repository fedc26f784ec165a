//! WeatherAPI.com client for the 14 day daily forecast.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::WeatherError;
use crate::provider::{build_client, read_json, MediumTermProvider, DEFAULT_REQUEST_TIMEOUT};
use crate::types::{DailyForecast, GeoPoint};

pub const WEATHERAPI_API_BASE: &str = "https://api.weatherapi.com/v1";
const PROVIDER: &str = "WeatherAPI";
const MAX_FORECAST_DAYS: u32 = 14;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: DaySummary,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    maxtemp_c: Option<f64>,
    mintemp_c: Option<f64>,
    daily_chance_of_rain: Option<serde_json::Value>,
    condition: Option<DayCondition>,
}

#[derive(Debug, Deserialize)]
struct DayCondition {
    text: String,
}

/// WeatherAPI has sent the chance of rain both as a number and as a string.
fn chance_of_rain(value: Option<&serde_json::Value>) -> Option<f64> {
    match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub struct WeatherApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, WEATHERAPI_API_BASE, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl std::fmt::Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MediumTermProvider for WeatherApiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn attribution(&self) -> &str {
        "Powered by WeatherAPI.com"
    }

    #[instrument(skip(self), level = "debug")]
    async fn daily_forecast(
        &self,
        point: GeoPoint,
        days_ahead: u32,
    ) -> Result<Vec<DailyForecast>, WeatherError> {
        let url = format!("{}/forecast.json", self.base_url);
        let days = days_ahead.clamp(1, MAX_FORECAST_DAYS);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.clone()),
                ("q", format!("{},{}", point.latitude, point.longitude)),
                ("days", days.to_string()),
                ("aqi", "no".to_string()),
                ("alerts", "no".to_string()),
            ])
            .send()
            .await?;

        let resp: ForecastResponse = read_json(PROVIDER, response).await?;

        let mut forecasts = Vec::with_capacity(resp.forecast.forecastday.len());
        for day in resp.forecast.forecastday {
            let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
                .map_err(|e| WeatherError::Parse(format!("bad forecast date {:?}: {e}", day.date)))?;
            forecasts.push(DailyForecast {
                date,
                min_temp_c: day.day.mintemp_c,
                max_temp_c: day.day.maxtemp_c,
                condition_label: day.day.condition.map(|c| c.text).unwrap_or_default(),
                chance_of_rain_pct: chance_of_rain(day.day.daily_chance_of_rain.as_ref()),
            });
        }

        tracing::debug!("WeatherAPI returned {} forecast days", forecasts.len());
        Ok(forecasts)
    }
}
