//! Per-horizon estimate builders. Each turns provider responses into a
//! `WeatherEstimate` or reports why it could not.

pub mod climate;
pub mod medium_term;
pub mod near_term;
