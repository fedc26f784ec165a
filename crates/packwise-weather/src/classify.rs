//! Precipitation probability to rain-chance mapping.

use crate::types::RainChance;

/// Classify a precipitation probability on a 0..=1 scale.
///
/// Bucket edges belong to the lower bucket: 0.3 is `Slight`, 0.7 is `Chance`.
/// Values at or below zero (and NaN) count as no rain.
pub fn classify_rain_chance(probability: f64) -> RainChance {
    if probability.is_nan() || probability <= 0.0 {
        RainChance::None
    } else if probability <= 0.3 {
        RainChance::Slight
    } else if probability <= 0.7 {
        RainChance::Chance
    } else {
        RainChance::Certain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_table() {
        assert_eq!(classify_rain_chance(0.0), RainChance::None);
        assert_eq!(classify_rain_chance(0.3), RainChance::Slight);
        assert_eq!(classify_rain_chance(0.30001), RainChance::Chance);
        assert_eq!(classify_rain_chance(0.7), RainChance::Chance);
        assert_eq!(classify_rain_chance(0.70001), RainChance::Certain);
        assert_eq!(classify_rain_chance(1.0), RainChance::Certain);
    }

    #[test]
    fn test_smallest_positive_is_slight() {
        assert_eq!(classify_rain_chance(0.0001), RainChance::Slight);
    }

    #[test]
    fn test_monotonic_over_unit_interval() {
        let mut previous = classify_rain_chance(0.0);
        for step in 1..=1000 {
            let current = classify_rain_chance(f64::from(step) / 1000.0);
            assert!(current >= previous, "severity dropped at step {step}");
            previous = current;
        }
    }

    #[test]
    fn test_percent_scale_matches() {
        // Callers holding a whole percentage divide by 100 first
        assert_eq!(classify_rain_chance(30.0 / 100.0), RainChance::Slight);
        assert_eq!(classify_rain_chance(31.0 / 100.0), RainChance::Chance);
        assert_eq!(classify_rain_chance(70.0 / 100.0), RainChance::Chance);
        assert_eq!(classify_rain_chance(71.0 / 100.0), RainChance::Certain);
    }
}
