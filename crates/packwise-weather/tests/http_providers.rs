use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use packwise_weather::{
    ForecastRequest, GeoPoint, ProviderCredentials, ProviderEndpoints, RainChance, ResolverConfig,
    WeatherResolver, FALLBACK_SOURCE,
};

fn resolver_for(server: &MockServer) -> WeatherResolver {
    let mut config = ResolverConfig::new(ProviderCredentials::new("owm", "wapi", "rapid"));
    config.request_timeout = Duration::from_secs(5);
    config.endpoints = ProviderEndpoints {
        openweathermap: Some(server.uri()),
        weatherapi: Some(server.uri()),
        meteostat: Some(server.uri()),
    };
    WeatherResolver::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_near_term_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "weather": [{"main": "Clear", "description": "clear sky"}],
            "main": {"temp": 20.0, "temp_min": 18.0, "temp_max": 22.0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("appid", "owm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [
                {
                    "dt": 1741608000,
                    "main": {"temp": 11.0, "temp_min": 10.6, "temp_max": 12.4},
                    "weather": [{"main": "Drizzle", "description": "light drizzle"}],
                    "pop": 0.82
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let request = ForecastRequest::new(
        GeoPoint::new(53.35, -6.26),
        NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
    );

    let estimate = resolver_for(&server)
        .resolve_at(&request, now)
        .await
        .into_estimate()
        .unwrap();

    assert_eq!(estimate.source, "OpenWeatherMap");
    assert_eq!((estimate.min_temp_c, estimate.max_temp_c), (11, 12));
    assert_eq!(estimate.precipitation_probability_pct, 82);
    assert_eq!(estimate.rain_chance, RainChance::Certain);
    assert_eq!(estimate.description.as_deref(), Some("light drizzle"));
}

#[tokio::test]
async fn test_server_error_degrades_to_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let request = ForecastRequest::new(
        GeoPoint::new(53.35, -6.26),
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
    );

    let resolution = resolver_for(&server).resolve_at(&request, now).await;
    assert!(resolution.is_fallback());
    assert_eq!(resolution.estimate().unwrap().source, FALLBACK_SOURCE);
}

#[tokio::test]
async fn test_malformed_climate_payload_degrades_to_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/point/monthly"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let request = ForecastRequest::new(
        GeoPoint::new(53.35, -6.26),
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
    );

    let resolution = resolver_for(&server).resolve_at(&request, now).await;
    assert!(resolution.is_fallback());
}
