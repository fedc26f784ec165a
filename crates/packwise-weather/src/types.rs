use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::classify_rain_chance;

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both coordinates are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Coordinates rounded to two decimals (roughly 1 km), used for cache keys.
    pub fn rounded(&self) -> (f64, f64) {
        (
            (self.latitude * 100.0).round() / 100.0,
            (self.longitude * 100.0).round() / 100.0,
        )
    }
}

/// A request for weather at one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub point: GeoPoint,
    /// Day the weather is wanted for (usually the destination's start date)
    pub target_date: NaiveDate,
    /// Optional end of the stay; only the near-term tier looks at it
    pub range_end: Option<NaiveDate>,
}

impl ForecastRequest {
    pub fn new(point: GeoPoint, target_date: NaiveDate) -> Self {
        Self {
            point,
            target_date,
            range_end: None,
        }
    }

    pub fn with_range_end(mut self, range_end: NaiveDate) -> Self {
        self.range_end = Some(range_end);
        self
    }
}

/// Coarse rain likelihood derived from a precipitation probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainChance {
    None,
    Slight,
    Chance,
    Certain,
}

impl RainChance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Slight => "slight",
            Self::Chance => "chance",
            Self::Certain => "certain",
        }
    }
}

impl std::fmt::Display for RainChance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical weather condition categories shared by every provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Conditions {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Fog,
    #[default]
    Unknown,
}

impl Conditions {
    /// Map an OpenWeatherMap `weather[].main` group name.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_openweathermap(main: &str) -> Self {
        match main {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" => Self::Rain,
            "Drizzle" => Self::Drizzle,
            "Thunderstorm" => Self::Thunderstorm,
            "Snow" => Self::Snow,
            "Mist" | "Fog" | "Haze" | "Smoke" | "Dust" | "Sand" | "Ash" => Self::Fog,
            _ => Self::Unknown,
        }
    }

    /// Map a free-text label such as "Patchy light rain with thunder".
    ///
    /// Keywords are checked from most to least severe so mixed labels land in
    /// the category a traveller would pack for.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| label.contains(w));

        if has(&["thunder"]) {
            Self::Thunderstorm
        } else if has(&["snow", "sleet", "blizzard", "ice pellets"]) {
            Self::Snow
        } else if has(&["drizzle"]) {
            Self::Drizzle
        } else if has(&["rain", "shower"]) {
            Self::Rain
        } else if has(&["fog", "mist", "haze"]) {
            Self::Fog
        } else if has(&["cloud", "overcast"]) {
            Self::Clouds
        } else if has(&["sunny", "clear"]) {
            Self::Clear
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Conditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized weather estimate returned for a destination.
///
/// Every tier produces this shape. Build it through [`WeatherEstimate::from_readings`]
/// so the temperature ordering and rain-chance invariants always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEstimate {
    pub min_temp_c: i32,
    pub max_temp_c: i32,
    pub conditions: Conditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub precipitation_probability_pct: u8,
    pub rain_chance: RainChance,
    pub is_approximate: bool,
    pub source: String,
    pub attribution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl WeatherEstimate {
    /// Build an exact (non-approximate) estimate from raw Celsius readings and
    /// a 0..=100 precipitation probability.
    ///
    /// Temperatures are rounded and swapped if reversed; the probability is
    /// rounded and clamped before the rain chance is derived from it.
    pub fn from_readings(
        min_temp_c: f64,
        max_temp_c: f64,
        conditions: Conditions,
        description: Option<String>,
        precipitation_probability_pct: f64,
        source: impl Into<String>,
        attribution: impl Into<String>,
    ) -> Self {
        let mut min = round_temp(min_temp_c);
        let mut max = round_temp(max_temp_c);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }

        let pct = if precipitation_probability_pct.is_finite() {
            precipitation_probability_pct.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };

        Self {
            min_temp_c: min,
            max_temp_c: max,
            conditions,
            description: description.filter(|d| !d.trim().is_empty()),
            precipitation_probability_pct: pct,
            rain_chance: classify_rain_chance(f64::from(pct) / 100.0),
            is_approximate: false,
            source: source.into(),
            attribution: attribution.into(),
            warning: None,
        }
    }

    /// Mark the estimate as an approximation carrying a warning for the user.
    pub fn approximate(mut self, warning: impl Into<String>) -> Self {
        self.is_approximate = true;
        self.warning = Some(warning.into());
        self
    }

    /// Check the invariants every estimate must satisfy.
    pub fn is_consistent(&self) -> bool {
        self.min_temp_c <= self.max_temp_c
            && self.precipitation_probability_pct <= 100
            && self.rain_chance
                == classify_rain_chance(f64::from(self.precipitation_probability_pct) / 100.0)
            && (!self.is_approximate || self.warning.as_deref().is_some_and(|w| !w.is_empty()))
    }

    /// Temperature range for display, e.g. "15–25°C".
    pub fn temperature_range(&self) -> String {
        if self.min_temp_c == self.max_temp_c {
            format!("{}°C", self.min_temp_c)
        } else {
            format!("{}–{}°C", self.min_temp_c, self.max_temp_c)
        }
    }

    /// One-line summary for logs and the CLI.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{}, {} ({}% precipitation, rain {})",
            self.conditions,
            self.temperature_range(),
            self.precipitation_probability_pct,
            self.rain_chance
        );
        if self.is_approximate {
            line.push_str(" [approximate]");
        }
        line
    }
}

fn round_temp(value: f64) -> i32 {
    if value.is_finite() {
        value.round() as i32
    } else {
        0
    }
}

/// Current conditions reported by the near-term provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub conditions: Conditions,
    pub description: Option<String>,
}

/// One slot of the near-term provider's interval forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub conditions: Conditions,
    pub description: Option<String>,
    /// Probability of precipitation on a 0..=1 scale
    pub precipitation_probability: Option<f64>,
}

/// One day of the medium-term provider's daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub condition_label: String,
    /// Daily chance of rain on a 0..=100 scale
    pub chance_of_rain_pct: Option<f64>,
}

/// Monthly climate aggregate from the historical provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClimate {
    /// First day of the month the aggregate covers
    pub month: NaiveDate,
    pub avg_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    /// Total precipitation in millimetres
    pub precipitation_mm: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openweathermap_groups() {
        assert_eq!(Conditions::from_openweathermap("Clear"), Conditions::Clear);
        assert_eq!(Conditions::from_openweathermap("Clouds"), Conditions::Clouds);
        assert_eq!(Conditions::from_openweathermap("Rain"), Conditions::Rain);
        assert_eq!(Conditions::from_openweathermap("Haze"), Conditions::Fog);
        assert_eq!(Conditions::from_openweathermap("Tornado"), Conditions::Unknown);
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(Conditions::from_label("Sunny"), Conditions::Clear);
        assert_eq!(Conditions::from_label("Partly cloudy"), Conditions::Clouds);
        assert_eq!(Conditions::from_label("Patchy rain possible"), Conditions::Rain);
        assert_eq!(Conditions::from_label("Light drizzle"), Conditions::Drizzle);
        assert_eq!(Conditions::from_label("Moderate snow"), Conditions::Snow);
        assert_eq!(Conditions::from_label("Patchy sleet possible"), Conditions::Snow);
        assert_eq!(
            Conditions::from_label("Patchy light rain with thunder"),
            Conditions::Thunderstorm
        );
        assert_eq!(Conditions::from_label("Freezing fog"), Conditions::Fog);
        assert_eq!(Conditions::from_label(""), Conditions::Unknown);
    }

    #[test]
    fn test_from_readings_swaps_and_rounds() {
        let estimate = WeatherEstimate::from_readings(
            24.6,
            14.4,
            Conditions::Clear,
            None,
            42.4,
            "Test",
            "Test data",
        );
        assert_eq!(estimate.min_temp_c, 14);
        assert_eq!(estimate.max_temp_c, 25);
        assert_eq!(estimate.precipitation_probability_pct, 42);
        assert_eq!(estimate.rain_chance, RainChance::Chance);
        assert!(!estimate.is_approximate);
        assert!(estimate.is_consistent());
    }

    #[test]
    fn test_from_readings_clamps_probability() {
        let high = WeatherEstimate::from_readings(1.0, 2.0, Conditions::Rain, None, 180.0, "T", "T");
        assert_eq!(high.precipitation_probability_pct, 100);
        assert_eq!(high.rain_chance, RainChance::Certain);

        let nan = WeatherEstimate::from_readings(1.0, 2.0, Conditions::Rain, None, f64::NAN, "T", "T");
        assert_eq!(nan.precipitation_probability_pct, 0);
        assert_eq!(nan.rain_chance, RainChance::None);
    }

    #[test]
    fn test_approximate_requires_warning() {
        let mut estimate =
            WeatherEstimate::from_readings(10.0, 20.0, Conditions::Clear, None, 0.0, "T", "T")
                .approximate("historical");
        assert!(estimate.is_consistent());

        estimate.warning = None;
        assert!(!estimate.is_consistent());
    }

    #[test]
    fn test_temperature_range_format() {
        let estimate =
            WeatherEstimate::from_readings(15.0, 25.0, Conditions::Clear, None, 0.0, "T", "T");
        assert_eq!(estimate.temperature_range(), "15–25°C");

        let flat = WeatherEstimate::from_readings(7.0, 7.2, Conditions::Clear, None, 0.0, "T", "T");
        assert_eq!(flat.temperature_range(), "7°C");
    }

    #[test]
    fn test_estimate_serializes_rain_chance_lowercase() {
        let estimate =
            WeatherEstimate::from_readings(15.0, 25.0, Conditions::Clouds, None, 20.0, "T", "T");
        let json = serde_json::to_value(&estimate).unwrap();
        assert_eq!(json["rain_chance"], "slight");
        assert_eq!(json["conditions"], "Clouds");
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn test_geo_point_validation_and_rounding() {
        assert!(GeoPoint::new(48.8566, 2.3522).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert_eq!(GeoPoint::new(48.8566, 2.3522).rounded(), (48.86, 2.35));
    }
}
