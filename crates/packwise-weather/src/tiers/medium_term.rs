//! Medium-term tier (6–14 days): daily forecast.

use crate::error::WeatherError;
use crate::provider::MediumTermProvider;
use crate::types::{Conditions, DailyForecast, ForecastRequest, WeatherEstimate};

pub const FORECAST_DAYS: u32 = 14;

/// Pick the day matching the target date, or the first day in the response.
pub fn select_day<'a>(
    days: &'a [DailyForecast],
    request: &ForecastRequest,
) -> Option<&'a DailyForecast> {
    days.iter()
        .find(|d| d.date == request.target_date)
        .or_else(|| {
            let first = days.first();
            if let Some(day) = first {
                tracing::warn!(
                    "No daily forecast for {}, using {} instead",
                    request.target_date,
                    day.date
                );
            }
            first
        })
}

pub(crate) async fn estimate(
    provider: &dyn MediumTermProvider,
    request: &ForecastRequest,
) -> Result<WeatherEstimate, WeatherError> {
    let days = provider.daily_forecast(request.point, FORECAST_DAYS).await?;

    let Some(day) = select_day(&days, request) else {
        return Err(WeatherError::NoUsableData("empty daily forecast".into()));
    };

    let (min, max) = match (day.min_temp_c, day.max_temp_c) {
        (Some(min), Some(max)) => (min, max),
        (Some(t), None) | (None, Some(t)) => (t, t),
        (None, None) => {
            return Err(WeatherError::NoUsableData(format!(
                "no temperature for {}",
                day.date
            )))
        }
    };

    let label = day.condition_label.trim();
    Ok(WeatherEstimate::from_readings(
        min,
        max,
        Conditions::from_label(label),
        Some(label.to_string()),
        day.chance_of_rain_pct.unwrap_or(0.0),
        provider.name(),
        provider.attribution(),
    ))
}
