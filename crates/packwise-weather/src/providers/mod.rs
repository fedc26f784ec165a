//! HTTP clients for the three weather data providers.

pub mod meteostat;
pub mod openweathermap;
pub mod weatherapi;

pub use meteostat::MeteostatClient;
pub use openweathermap::OpenWeatherMapClient;
pub use weatherapi::WeatherApiClient;
