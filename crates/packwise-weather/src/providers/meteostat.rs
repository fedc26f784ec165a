//! Meteostat (via RapidAPI) client for monthly point climate data.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::WeatherError;
use crate::provider::{build_client, read_json, ClimateProvider, DEFAULT_REQUEST_TIMEOUT};
use crate::types::{GeoPoint, MonthlyClimate};

pub const METEOSTAT_API_BASE: &str = "https://meteostat.p.rapidapi.com";
const RAPIDAPI_HOST: &str = "meteostat.p.rapidapi.com";
const PROVIDER: &str = "Meteostat";

#[derive(Debug, Deserialize)]
struct MonthlyResponse {
    #[serde(default)]
    data: Vec<MonthlyRow>,
}

#[derive(Debug, Deserialize)]
struct MonthlyRow {
    date: String,
    tavg: Option<f64>,
    tmin: Option<f64>,
    tmax: Option<f64>,
    prcp: Option<f64>,
}

/// Meteostat labels monthly rows either "2020-07" or "2020-07-01".
fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .ok()
}

pub struct MeteostatClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MeteostatClient {
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, METEOSTAT_API_BASE, DEFAULT_REQUEST_TIMEOUT)
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

impl std::fmt::Debug for MeteostatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeteostatClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ClimateProvider for MeteostatClient {
    fn attribution(&self) -> &str {
        "Historical climate data from Meteostat"
    }

    #[instrument(skip(self), level = "debug")]
    async fn monthly_history(
        &self,
        point: GeoPoint,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthlyClimate>, WeatherError> {
        let url = format!("{}/point/monthly", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("start", start.format("%Y-%m-%d").to_string()),
                ("end", end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        let resp: MonthlyResponse = read_json(PROVIDER, response).await?;

        let months = resp
            .data
            .into_iter()
            .filter_map(|row| match parse_month(&row.date) {
                Some(month) => Some(MonthlyClimate {
                    month,
                    avg_temp_c: row.tavg,
                    min_temp_c: row.tmin,
                    max_temp_c: row.tmax,
                    precipitation_mm: row.prcp,
                }),
                None => {
                    tracing::debug!("Skipping Meteostat row with bad date {:?}", row.date);
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("Meteostat returned {} monthly rows", months.len());
        Ok(months)
    }
}
