use std::path::Path;
use std::sync::Arc;

use packwise_weather::WeatherResolver;

use crate::config::ValidationResult;
use crate::error::{AppError, ConfigError};
use crate::Config;

/// Application state: loaded configuration and the weather resolver built
/// from it.
pub struct App {
    config: Arc<Config>,
    resolver: Arc<WeatherResolver>,
}

impl App {
    /// Load configuration from the default location and build the application
    pub fn new() -> Result<Self, AppError> {
        Self::load_from(&Config::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let config = Config::load_from(path).map_err(|e| match e.downcast::<ConfigError>() {
            Ok(config_err) => AppError::Config(config_err),
            Err(other) => AppError::Other(other),
        })?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let validation = config.validate();
        if !validation.is_valid() {
            return Err(rejection(&validation).into());
        }
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        let resolver = WeatherResolver::from_config(&config.weather.resolver_config())?;
        tracing::info!(
            "Weather resolver ready (cache: {})",
            match config.weather.cache_ttl_minutes {
                0 => "off".to_string(),
                minutes => format!("{minutes} min"),
            }
        );

        Ok(Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> Arc<WeatherResolver> {
        self.resolver.clone()
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down");
        if let Some(cache) = self.resolver.cache() {
            tracing::debug!("Dropping {} cached estimates", cache.len());
            cache.clear();
        }
    }
}

/// Missing keys get their own error so the user is pointed at the keys;
/// anything else is reported as invalid.
fn rejection(validation: &ValidationResult) -> ConfigError {
    let only_keys = validation
        .errors
        .iter()
        .all(|e| e.field.ends_with("_api_key"));
    if only_keys {
        let fields: Vec<&str> = validation.errors.iter().map(|e| e.field.as_str()).collect();
        ConfigError::MissingSetting(fields.join(", "))
    } else {
        ConfigError::Invalid(validation.error_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn configured() -> Config {
        let mut config = Config::default();
        config.weather.openweathermap_api_key = "owm-key".to_string();
        config.weather.weatherapi_api_key = "wapi-key".to_string();
        config.weather.meteostat_api_key = "rapid-key".to_string();
        config
    }

    #[test]
    fn test_from_config_builds_resolver() {
        let app = App::from_config(configured()).unwrap();
        assert_eq!(app.config().weather.cache_ttl_minutes, 30);
        assert!(app.resolver().cache().is_some());
    }

    #[test]
    fn test_missing_keys_are_reported() {
        let mut config = configured();
        config.weather.meteostat_api_key = "YOUR_METEOSTAT_API_KEY".to_string();

        let err = App::from_config(config).err().unwrap();
        match err {
            AppError::Config(ConfigError::MissingSetting(fields)) => {
                assert_eq!(fields, "weather.meteostat_api_key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = configured();
        config.weather.request_timeout_secs = 0;
        let err = App::from_config(config).err().unwrap();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_key_with_other_errors_is_reported_once() {
        let mut config = configured();
        config.weather.openweathermap_api_key = String::new();
        config.weather.request_timeout_secs = 0;

        match App::from_config(config).err().unwrap() {
            AppError::Config(ConfigError::Invalid(summary)) => {
                assert_eq!(summary.matches("weather.openweathermap_api_key").count(), 1);
                assert!(summary.contains("weather.request_timeout_secs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = configured();
        config.weather.cache_ttl_minutes = 0;
        config.save_to(&path).unwrap();

        let app = App::load_from(&path).unwrap();
        assert_eq!(app.config().weather.weatherapi_api_key, "wapi-key");
        assert!(app.resolver().cache().is_none());
    }

    #[test]
    fn test_load_from_malformed_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[weather\nbroken").unwrap();

        let err = App::load_from(&path).err().unwrap();
        assert!(matches!(err, AppError::Config(ConfigError::ParseError(_))));
    }
}
