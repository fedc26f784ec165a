//! Generic estimate used when the selected tier cannot produce one.

use crate::types::{Conditions, WeatherEstimate};

pub const FALLBACK_SOURCE: &str = "Fallback";
pub const FALLBACK_WARNING: &str =
    "Weather service unavailable. Showing a generic estimate, pack for mixed conditions.";

const FALLBACK_MIN_C: f64 = 15.0;
const FALLBACK_MAX_C: f64 = 25.0;
const FALLBACK_PRECIPITATION_PCT: f64 = 30.0;

/// Mild, slightly damp day.
pub fn fallback_estimate() -> WeatherEstimate {
    WeatherEstimate::from_readings(
        FALLBACK_MIN_C,
        FALLBACK_MAX_C,
        Conditions::Unknown,
        None,
        FALLBACK_PRECIPITATION_PCT,
        FALLBACK_SOURCE,
        "",
    )
    .approximate(FALLBACK_WARNING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RainChance;

    #[test]
    fn test_fallback_values() {
        let estimate = fallback_estimate();
        assert_eq!(estimate.min_temp_c, 15);
        assert_eq!(estimate.max_temp_c, 25);
        assert_eq!(estimate.conditions, Conditions::Unknown);
        assert_eq!(estimate.precipitation_probability_pct, 30);
        assert_eq!(estimate.rain_chance, RainChance::Slight);
        assert!(estimate.is_approximate);
        assert_eq!(estimate.source, "Fallback");
        assert!(estimate.warning.is_some());
        assert!(estimate.is_consistent());
    }
}
