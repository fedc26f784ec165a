//! Weather resolution for Packwise
//!
//! Produces a normalized [`WeatherEstimate`] for a destination and date by
//! picking a data source by forecast horizon: an interval forecast up to five
//! days out, a daily forecast up to two weeks, and historical monthly
//! averages beyond that. Provider failures degrade to a generic estimate.

pub mod cache;
pub mod classify;
pub mod error;
pub mod fallback;
pub mod horizon;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod tiers;
pub mod types;

pub use cache::EstimateCache;
pub use classify::classify_rain_chance;
pub use error::WeatherError;
pub use fallback::{fallback_estimate, FALLBACK_SOURCE};
pub use horizon::{days_until, Horizon};
pub use provider::{ClimateProvider, MediumTermProvider, NearTermProvider, ProviderCredentials};
pub use resolver::{BatchEntry, ProviderEndpoints, Resolution, ResolverConfig, WeatherResolver};
pub use types::*;
