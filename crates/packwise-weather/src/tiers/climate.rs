//! Climate-average tier (more than 14 days out): historical monthly means.

use chrono::{DateTime, Datelike, Month, NaiveDate, Utc};

use crate::error::WeatherError;
use crate::provider::ClimateProvider;
use crate::types::{Conditions, ForecastRequest, MonthlyClimate, WeatherEstimate};

pub const CLIMATE_SOURCE: &str = "Climate Averages";
pub const CLIMATE_WARNING: &str =
    "Based on historical averages for this month, not a forecast. Check again closer to your trip.";

/// Number of past years averaged.
pub const HISTORY_YEARS: i32 = 5;
/// Default spread applied around the monthly mean when min/max are missing.
const DEFAULT_SPREAD_C: f64 = 5.0;
/// Upper bound on the precipitation-derived probability.
const PROBABILITY_CAP_PCT: f64 = 80.0;

/// Same calendar month over the last `HISTORY_YEARS` complete years:
/// first day of the month `HISTORY_YEARS` years back through the last day of
/// that month last year.
pub fn history_window(month: u32, now: DateTime<Utc>) -> Option<(NaiveDate, NaiveDate)> {
    let year = now.year();
    let start = NaiveDate::from_ymd_opt(year - HISTORY_YEARS, month, 1)?;
    let end = last_day_of_month(year - 1, month)?;
    Some((start, end))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Precipitation heuristic: twice the mean monthly millimetres, capped.
///
/// This is a policy constant rather than a measured probability.
pub fn estimated_probability_pct(mean_precipitation_mm: f64) -> f64 {
    (mean_precipitation_mm * 2.0).round().min(PROBABILITY_CAP_PCT).max(0.0)
}

/// Coarse conditions implied by the estimated probability.
pub fn conditions_for_probability(probability_pct: f64) -> Conditions {
    if probability_pct > 60.0 {
        Conditions::Rain
    } else if probability_pct > 30.0 {
        Conditions::Clouds
    } else {
        Conditions::Clear
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

/// Average the usable records for `month` into an approximate estimate.
pub fn estimate_from_history(
    records: &[MonthlyClimate],
    month: u32,
    attribution: &str,
) -> Result<WeatherEstimate, WeatherError> {
    let usable: Vec<(f64, &MonthlyClimate)> = records
        .iter()
        .filter(|r| r.month.month() == month)
        .filter_map(|r| r.avg_temp_c.map(|avg| (avg, r)))
        .collect();

    if usable.is_empty() {
        return Err(WeatherError::NoUsableData(format!(
            "no monthly averages for month {month}"
        )));
    }

    let mean_min = mean(
        usable
            .iter()
            .map(|&(avg, r)| r.min_temp_c.unwrap_or(avg - DEFAULT_SPREAD_C)),
    );
    let mean_max = mean(
        usable
            .iter()
            .map(|&(avg, r)| r.max_temp_c.unwrap_or(avg + DEFAULT_SPREAD_C)),
    );
    let mean_avg = mean(usable.iter().map(|&(avg, _)| avg));
    let mean_precipitation = mean(
        usable
            .iter()
            .map(|&(_, r)| r.precipitation_mm.unwrap_or(0.0)),
    );

    let probability_pct = estimated_probability_pct(mean_precipitation);
    tracing::debug!(
        "Climate average over {} months: avg {:.1}°C, precip {:.1}mm -> {}%",
        usable.len(),
        mean_avg,
        mean_precipitation,
        probability_pct
    );

    let description = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| format!("Typical {} weather, around {:.0}°C", m.name(), mean_avg));

    Ok(WeatherEstimate::from_readings(
        mean_min,
        mean_max,
        conditions_for_probability(probability_pct),
        description,
        probability_pct,
        CLIMATE_SOURCE,
        attribution,
    )
    .approximate(CLIMATE_WARNING))
}

pub(crate) async fn estimate(
    provider: &dyn ClimateProvider,
    request: &ForecastRequest,
    now: DateTime<Utc>,
) -> Result<WeatherEstimate, WeatherError> {
    let month = request.target_date.month();
    let (start, end) = history_window(month, now).ok_or_else(|| {
        WeatherError::NoUsableData(format!("cannot build history window for month {month}"))
    })?;

    let records = provider
        .monthly_history(request.point, start, end)
        .await?;
    estimate_from_history(&records, month, provider.attribution())
}
