//! Near-term tier (0–5 days): interval forecast plus current conditions.

use chrono::{DateTime, Utc};

use crate::error::WeatherError;
use crate::horizon::days_until;
use crate::provider::NearTermProvider;
use crate::types::{Conditions, ForecastRequest, WeatherEstimate};

/// Index of the forecast slot `days` ahead, clamped to the list.
///
/// Returns `None` only for an empty list.
pub fn slot_index(days: f64, points_per_day: u32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let raw = (days * f64::from(points_per_day)).floor();
    let index = if raw.is_finite() && raw > 0.0 {
        raw as usize
    } else {
        0
    };
    Some(index.min(len - 1))
}

/// Day offset used for slot selection: the target day itself, or the
/// midpoint of the stay when a later range end is given.
pub fn slot_offset_days(request: &ForecastRequest, now: DateTime<Utc>) -> f64 {
    let start = days_until(request.target_date, now);
    match request.range_end {
        Some(end) if end > request.target_date => {
            let end = days_until(end, now);
            (start + end) as f64 / 2.0
        }
        _ => start as f64,
    }
}

pub(crate) async fn estimate(
    provider: &dyn NearTermProvider,
    request: &ForecastRequest,
    now: DateTime<Utc>,
) -> Result<WeatherEstimate, WeatherError> {
    let (current, forecast) = tokio::join!(
        provider.current_conditions(request.point),
        provider.short_range_forecast(request.point)
    );
    let forecast = forecast?;
    let current = current?;

    let offset = slot_offset_days(request, now);
    let slot = slot_index(offset, provider.points_per_day(), forecast.len())
        .and_then(|i| forecast.get(i).map(|slot| (i, slot)));
    let Some((index, slot)) = slot else {
        return Err(WeatherError::NoUsableData("empty forecast list".into()));
    };
    tracing::debug!(
        "Near-term slot {} of {} for offset {:.1} days",
        index,
        forecast.len(),
        offset
    );

    let (min, max) = match (slot.min_temp_c, slot.max_temp_c) {
        (Some(min), Some(max)) => (min, max),
        (Some(t), None) | (None, Some(t)) => (t, t),
        (None, None) => {
            tracing::debug!("Slot {} has no temperature, using current conditions", index);
            (current.min_temp_c, current.max_temp_c)
        }
    };

    let (conditions, description) = if slot.conditions == Conditions::Unknown {
        (current.conditions, current.description.clone())
    } else {
        (slot.conditions, slot.description.clone())
    };

    let probability_pct = slot.precipitation_probability.unwrap_or(0.0) * 100.0;

    Ok(WeatherEstimate::from_readings(
        min,
        max,
        conditions,
        description,
        probability_pct,
        provider.name(),
        provider.attribution(),
    ))
}
