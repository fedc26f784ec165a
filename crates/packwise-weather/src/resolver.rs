//! Horizon dispatch: pick a tier for the target date, run it, and degrade to
//! the fallback estimate when the tier cannot deliver.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::EstimateCache;
use crate::error::WeatherError;
use crate::fallback::fallback_estimate;
use crate::horizon::{days_until, Horizon};
use crate::provider::{
    ClimateProvider, MediumTermProvider, NearTermProvider, ProviderCredentials,
    DEFAULT_REQUEST_TIMEOUT,
};
use crate::providers::meteostat::{MeteostatClient, METEOSTAT_API_BASE};
use crate::providers::openweathermap::{OpenWeatherMapClient, OPENWEATHERMAP_API_BASE};
use crate::providers::weatherapi::{WeatherApiClient, WEATHERAPI_API_BASE};
use crate::tiers::{climate, medium_term, near_term};
use crate::types::{ForecastRequest, GeoPoint, WeatherEstimate};

/// Base URL overrides, mainly for pointing the clients at a test server.
#[derive(Debug, Clone, Default)]
pub struct ProviderEndpoints {
    pub openweathermap: Option<String>,
    pub weatherapi: Option<String>,
    pub meteostat: Option<String>,
}

/// Everything needed to build a resolver backed by the real HTTP clients.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub credentials: ProviderCredentials,
    pub request_timeout: Duration,
    /// `None` disables the estimate cache
    pub cache_ttl: Option<Duration>,
    pub endpoints: ProviderEndpoints,
}

impl ResolverConfig {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            credentials,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_ttl: None,
            endpoints: ProviderEndpoints::default(),
        }
    }
}

/// Outcome of a single resolution.
#[derive(Debug)]
pub enum Resolution {
    /// Target date is before today; there is nothing to estimate.
    PastDate,
    Resolved(WeatherEstimate),
    /// The selected tier failed and the generic estimate was used instead.
    Fallback {
        estimate: WeatherEstimate,
        reason: WeatherError,
    },
}

impl Resolution {
    pub fn estimate(&self) -> Option<&WeatherEstimate> {
        match self {
            Self::PastDate => None,
            Self::Resolved(estimate) | Self::Fallback { estimate, .. } => Some(estimate),
        }
    }

    pub fn into_estimate(self) -> Option<WeatherEstimate> {
        match self {
            Self::PastDate => None,
            Self::Resolved(estimate) | Self::Fallback { estimate, .. } => Some(estimate),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// One result of [`WeatherResolver::resolve_many`], tagged with the position
/// of its request in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub index: usize,
    pub estimate: Option<WeatherEstimate>,
}

pub struct WeatherResolver {
    near_term: Arc<dyn NearTermProvider>,
    medium_term: Arc<dyn MediumTermProvider>,
    climate: Arc<dyn ClimateProvider>,
    cache: Option<EstimateCache>,
}

impl std::fmt::Debug for WeatherResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherResolver")
            .field("near_term", &self.near_term.name())
            .field("medium_term", &self.medium_term.name())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl WeatherResolver {
    /// Build a resolver over the OpenWeatherMap, WeatherAPI and Meteostat
    /// clients.
    ///
    /// Fails with [`WeatherError::Configuration`] when any credential is
    /// blank or a placeholder.
    pub fn from_config(config: &ResolverConfig) -> Result<Self, WeatherError> {
        config.credentials.validate()?;

        let timeout = config.request_timeout;
        let endpoints = &config.endpoints;

        let near_term = OpenWeatherMapClient::with_base_url(
            &config.credentials.openweathermap,
            endpoints.openweathermap.as_deref().unwrap_or(OPENWEATHERMAP_API_BASE),
            timeout,
        )?;
        let medium_term = WeatherApiClient::with_base_url(
            &config.credentials.weatherapi,
            endpoints.weatherapi.as_deref().unwrap_or(WEATHERAPI_API_BASE),
            timeout,
        )?;
        let climate = MeteostatClient::with_base_url(
            &config.credentials.meteostat,
            endpoints.meteostat.as_deref().unwrap_or(METEOSTAT_API_BASE),
            timeout,
        )?;

        let resolver = Self::with_providers(
            Arc::new(near_term),
            Arc::new(medium_term),
            Arc::new(climate),
        );

        Ok(match config.cache_ttl {
            Some(ttl) if !ttl.is_zero() => resolver.with_cache(ttl),
            _ => resolver,
        })
    }

    pub fn with_providers(
        near_term: Arc<dyn NearTermProvider>,
        medium_term: Arc<dyn MediumTermProvider>,
        climate: Arc<dyn ClimateProvider>,
    ) -> Self {
        Self {
            near_term,
            medium_term,
            climate,
            cache: None,
        }
    }

    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(EstimateCache::new(ttl));
        self
    }

    pub fn cache(&self) -> Option<&EstimateCache> {
        self.cache.as_ref()
    }

    /// Estimate the weather at `point` on `target_date`.
    ///
    /// `None` means the date is in the past. Any provider failure yields the
    /// fallback estimate instead of an error.
    pub async fn resolve(
        &self,
        point: GeoPoint,
        target_date: NaiveDate,
        range_end: Option<NaiveDate>,
    ) -> Option<WeatherEstimate> {
        let mut request = ForecastRequest::new(point, target_date);
        request.range_end = range_end;
        self.resolve_request(&request).await
    }

    pub async fn resolve_request(&self, request: &ForecastRequest) -> Option<WeatherEstimate> {
        self.resolve_detailed(request).await.into_estimate()
    }

    pub async fn resolve_detailed(&self, request: &ForecastRequest) -> Resolution {
        self.resolve_at(request, Utc::now()).await
    }

    /// Resolve against an explicit clock.
    pub async fn resolve_at(&self, request: &ForecastRequest, now: DateTime<Utc>) -> Resolution {
        let days = days_until(request.target_date, now);
        let Some(horizon) = Horizon::select(days) else {
            tracing::debug!("{} is in the past ({} days)", request.target_date, days);
            return Resolution::PastDate;
        };

        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(request)) {
            tracing::debug!("Cache hit for {}", EstimateCache::key_for(request));
            return Resolution::Resolved(hit);
        }

        tracing::debug!(
            "Resolving {} at ({:.4}, {:.4}) via {} tier, {} days out",
            request.target_date,
            request.point.latitude,
            request.point.longitude,
            horizon.as_str(),
            days
        );

        let result = if request.point.is_valid() {
            self.run_tier(horizon, request, now).await
        } else {
            Err(WeatherError::NoUsableData(format!(
                "invalid coordinates ({}, {})",
                request.point.latitude, request.point.longitude
            )))
        };

        match result {
            Ok(estimate) => {
                if let Some(cache) = &self.cache {
                    cache.put(request, estimate.clone());
                }
                Resolution::Resolved(estimate)
            }
            Err(reason) => {
                tracing::warn!(
                    "{} tier failed for {}: {}; using fallback estimate",
                    horizon.as_str(),
                    request.target_date,
                    reason
                );
                Resolution::Fallback {
                    estimate: fallback_estimate(),
                    reason,
                }
            }
        }
    }

    async fn run_tier(
        &self,
        horizon: Horizon,
        request: &ForecastRequest,
        now: DateTime<Utc>,
    ) -> Result<WeatherEstimate, WeatherError> {
        match horizon {
            Horizon::NearTerm => near_term::estimate(self.near_term.as_ref(), request, now).await,
            Horizon::MediumTerm => medium_term::estimate(self.medium_term.as_ref(), request).await,
            Horizon::Climate => climate::estimate(self.climate.as_ref(), request, now).await,
        }
    }

    /// Resolve several requests concurrently. Output order matches input
    /// order and one failing request never affects the others.
    pub async fn resolve_many(&self, requests: &[ForecastRequest]) -> Vec<BatchEntry> {
        self.resolve_many_at(requests, Utc::now()).await
    }

    pub async fn resolve_many_at(
        &self,
        requests: &[ForecastRequest],
        now: DateTime<Utc>,
    ) -> Vec<BatchEntry> {
        let futures = requests.iter().enumerate().map(|(index, request)| async move {
            BatchEntry {
                index,
                estimate: self.resolve_at(request, now).await.into_estimate(),
            }
        });
        join_all(futures).await
    }
}
