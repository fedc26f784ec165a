//! OpenWeatherMap client: current conditions and the 5 day / 3 hour forecast.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::WeatherError;
use crate::provider::{build_client, read_json, NearTermProvider, DEFAULT_REQUEST_TIMEOUT};
use crate::types::{Conditions, CurrentConditions, ForecastPoint, GeoPoint};

pub const OPENWEATHERMAP_API_BASE: &str = "https://api.openweathermap.org/data/2.5";
const PROVIDER: &str = "OpenWeatherMap";

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastEntry {
    dt: i64,
    main: Option<OwmMain>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    #[serde(default)]
    list: Vec<OwmForecastEntry>,
}

fn condition_parts(weather: &[OwmCondition]) -> (Conditions, Option<String>) {
    weather
        .first()
        .map(|w| {
            (
                Conditions::from_openweathermap(&w.main),
                w.description.clone(),
            )
        })
        .unwrap_or((Conditions::Unknown, None))
}

pub struct OpenWeatherMapClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherMapClient {
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, OPENWEATHERMAP_API_BASE, DEFAULT_REQUEST_TIMEOUT)
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

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        point: GeoPoint,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        read_json(PROVIDER, response).await
    }
}

impl std::fmt::Debug for OpenWeatherMapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NearTermProvider for OpenWeatherMapClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn attribution(&self) -> &str {
        "Weather data provided by OpenWeatherMap"
    }

    #[instrument(skip(self), level = "debug")]
    async fn current_conditions(&self, point: GeoPoint) -> Result<CurrentConditions, WeatherError> {
        let resp: OwmCurrentResponse = self.get("weather", point).await?;

        let temp = resp.main.temp;
        let min = resp.main.temp_min.or(temp);
        let max = resp.main.temp_max.or(temp);
        let (Some(min_temp_c), Some(max_temp_c)) = (min, max) else {
            return Err(WeatherError::NoUsableData(
                "current conditions carry no temperature".into(),
            ));
        };

        let (conditions, description) = condition_parts(&resp.weather);
        Ok(CurrentConditions {
            min_temp_c,
            max_temp_c,
            conditions,
            description,
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn short_range_forecast(&self, point: GeoPoint) -> Result<Vec<ForecastPoint>, WeatherError> {
        let resp: OwmForecastResponse = self.get("forecast", point).await?;

        let points = resp
            .list
            .into_iter()
            .map(|entry| {
                let (conditions, description) = condition_parts(&entry.weather);
                let (min_temp_c, max_temp_c) = entry
                    .main
                    .map(|m| (m.temp_min.or(m.temp), m.temp_max.or(m.temp)))
                    .unwrap_or((None, None));
                ForecastPoint {
                    timestamp: DateTime::<Utc>::from_timestamp(entry.dt, 0).unwrap_or_default(),
                    min_temp_c,
                    max_temp_c,
                    conditions,
                    description,
                    precipitation_probability: entry.pop,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("OpenWeatherMap returned {} forecast points", points.len());
        Ok(points)
    }
}
