use anyhow::{Context, Result};
use packwise_weather::provider::is_usable_key;
use packwise_weather::{ProviderCredentials, ProviderEndpoints, ResolverConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const OPENWEATHERMAP_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";
pub const WEATHERAPI_KEY_VAR: &str = "WEATHERAPI_API_KEY";
pub const METEOSTAT_KEY_VAR: &str = "METEOSTAT_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,
}

/// Weather provider keys and resolver tuning
#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_openweathermap_key")]
    pub openweathermap_api_key: String,

    #[serde(default = "default_weatherapi_key")]
    pub weatherapi_api_key: String,

    /// RapidAPI key used for Meteostat
    #[serde(default = "default_meteostat_key")]
    pub meteostat_api_key: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Lifetime of cached estimates; 0 disables the cache
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openweathermap_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weatherapi_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meteostat_base_url: Option<String>,
}

fn key_from_env(var: &str, placeholder: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|k| is_usable_key(k))
        .unwrap_or_else(|| placeholder.to_string())
}

fn default_openweathermap_key() -> String {
    key_from_env(OPENWEATHERMAP_KEY_VAR, "YOUR_OPENWEATHERMAP_API_KEY")
}

fn default_weatherapi_key() -> String {
    key_from_env(WEATHERAPI_KEY_VAR, "YOUR_WEATHERAPI_API_KEY")
}

fn default_meteostat_key() -> String {
    key_from_env(METEOSTAT_KEY_VAR, "YOUR_METEOSTAT_API_KEY")
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_minutes() -> u64 {
    30
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            openweathermap_api_key: default_openweathermap_key(),
            weatherapi_api_key: default_weatherapi_key(),
            meteostat_api_key: default_meteostat_key(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            openweathermap_base_url: None,
            weatherapi_base_url: None,
            meteostat_base_url: None,
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("credentials", &self.credentials())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .finish_non_exhaustive()
    }
}

impl WeatherConfig {
    fn key_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("weather.openweathermap_api_key", self.openweathermap_api_key.as_str()),
            ("weather.weatherapi_api_key", self.weatherapi_api_key.as_str()),
            ("weather.meteostat_api_key", self.meteostat_api_key.as_str()),
        ]
    }

    /// Config fields whose key is blank or still a `YOUR_...` placeholder
    pub fn missing_keys(&self) -> Vec<&'static str> {
        self.key_fields()
            .into_iter()
            .filter(|(_, key)| !is_usable_key(key))
            .map(|(field, _)| field)
            .collect()
    }

    pub fn is_configured(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// Replace unusable keys with values from `lookup` (normally the process
    /// environment).
    pub fn fill_missing_keys(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let slots = [
            (&mut self.openweathermap_api_key, OPENWEATHERMAP_KEY_VAR),
            (&mut self.weatherapi_api_key, WEATHERAPI_KEY_VAR),
            (&mut self.meteostat_api_key, METEOSTAT_KEY_VAR),
        ];
        for (key, var) in slots {
            if is_usable_key(key.as_str()) {
                continue;
            }
            if let Some(value) = lookup(var).filter(|v| is_usable_key(v)) {
                tracing::debug!("Using {} from the environment", var);
                *key = value;
            }
        }
    }

    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials::new(
            self.openweathermap_api_key.trim(),
            self.weatherapi_api_key.trim(),
            self.meteostat_api_key.trim(),
        )
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::new(self.credentials());
        config.request_timeout = Duration::from_secs(self.request_timeout_secs);
        config.cache_ttl = match self.cache_ttl_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        };
        config.endpoints = ProviderEndpoints {
            openweathermap: self.openweathermap_base_url.clone(),
            weatherapi: self.weatherapi_base_url.clone(),
            meteostat: self.meteostat_base_url.clone(),
        };
        config
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_toml_str(&contents)?;
        config
            .weather
            .fill_missing_keys(|var| std::env::var(var).ok());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let weather = &self.weather;

        for field in weather.missing_keys() {
            result.add_error(field, "API key is missing or still a placeholder");
        }

        if weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is more than 2 minutes",
            );
        }

        if weather.cache_ttl_minutes == 0 {
            result.add_warning("weather.cache_ttl_minutes", "Estimate cache disabled (0 minutes)");
        } else if weather.cache_ttl_minutes > 1440 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Cached forecasts older than a day may be stale",
            );
        }

        let overrides = [
            ("weather.openweathermap_base_url", &weather.openweathermap_base_url),
            ("weather.weatherapi_base_url", &weather.weatherapi_base_url),
            ("weather.meteostat_base_url", &weather.meteostat_base_url),
        ];
        for (field, value) in overrides {
            if let Some(url) = value {
                validate_url(url, field, &mut result);
            }
        }

        result
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Path of the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("packwise");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
