//! Forecast horizon classification.

use chrono::{DateTime, NaiveDate, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Last day served by the near-term (interval forecast) tier.
pub const NEAR_TERM_MAX_DAYS: i64 = 5;
/// Last day served by the medium-term (daily forecast) tier.
pub const MEDIUM_TERM_MAX_DAYS: i64 = 14;

/// Which provider tier serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    NearTerm,
    MediumTerm,
    Climate,
}

impl Horizon {
    /// Select the tier for a day offset. Negative offsets are in the past and
    /// have no tier.
    pub fn select(days_until: i64) -> Option<Self> {
        match days_until {
            d if d < 0 => None,
            0..=NEAR_TERM_MAX_DAYS => Some(Self::NearTerm),
            d if d <= MEDIUM_TERM_MAX_DAYS => Some(Self::MediumTerm),
            _ => Some(Self::Climate),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NearTerm => "near-term",
            Self::MediumTerm => "medium-term",
            Self::Climate => "climate",
        }
    }
}

/// Whole days from `now` until the start (00:00 UTC) of `date`, rounded up.
///
/// Today yields 0 for any time of day, yesterday yields -1.
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let seconds = (start - now).num_seconds();
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_select_boundaries() {
        assert_eq!(Horizon::select(-1), None);
        assert_eq!(Horizon::select(0), Some(Horizon::NearTerm));
        assert_eq!(Horizon::select(5), Some(Horizon::NearTerm));
        assert_eq!(Horizon::select(6), Some(Horizon::MediumTerm));
        assert_eq!(Horizon::select(14), Some(Horizon::MediumTerm));
        assert_eq!(Horizon::select(15), Some(Horizon::Climate));
        assert_eq!(Horizon::select(365), Some(Horizon::Climate));
    }

    #[test]
    fn test_days_until_rounds_up() {
        let now = noon();
        assert_eq!(days_until(date(2025, 3, 10), now), 0);
        assert_eq!(days_until(date(2025, 3, 11), now), 1);
        assert_eq!(days_until(date(2025, 3, 9), now), -1);
        assert_eq!(days_until(date(2025, 3, 8), now), -2);
        assert_eq!(days_until(date(2025, 3, 25), now), 15);
    }

    #[test]
    fn test_days_until_at_midnight_is_exact() {
        let midnight = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(days_until(date(2025, 3, 10), midnight), 0);
        assert_eq!(days_until(date(2025, 3, 16), midnight), 6);
        assert_eq!(days_until(date(2025, 3, 9), midnight), -1);
    }
}
