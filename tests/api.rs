//! End-to-end tests for the HTTP surface against a mocked upstream

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use fancy_weather::{AppConfig, AppState, UpstreamClient, web};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORECAST_PATH: &str = "/weatherapi/locationforecast/2.0/compact";

fn config_for(uri: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.upstream.forecast_url = format!("{uri}{FORECAST_PATH}");
    config.upstream.geocode_url = format!("{uri}/search");
    config.upstream.user_agent = "FancyWeatherTest/1.0".to_string();
    config.upstream.max_retries = 0;
    config
}

fn app_for(uri: &str) -> Router {
    let config = config_for(uri);
    let upstream = UpstreamClient::new(&config.upstream).unwrap();
    web::app(&config, AppState::new(upstream))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn forecast(temperature: f64, humidity: f64, wind: f64) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [10.75, 59.91, 0]},
        "properties": {
            "meta": {"updated_at": "2026-10-16T10:00:00Z"},
            "timeseries": [{
                "time": "2026-10-16T12:00:00Z",
                "data": {"instant": {"details": {
                    "air_temperature": temperature,
                    "relative_humidity": humidity,
                    "wind_speed": wind
                }}}
            }]
        }
    })
}

#[tokio::test]
async fn test_root_reports_liveness() {
    let app = app_for("http://127.0.0.1:9");
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Backend is running");
}

#[tokio::test]
async fn test_weather_without_lat_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast(1.0, 1.0, 1.0)))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server.uri()), "/api/weather?lon=10.75").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing lat/lon"}));

    let (status, _) = get(app_for(&server.uri()), "/api/weather?lat=&lon=10.75").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weather_relays_upstream_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("lat", "59.91"))
        .and(query_param("lon", "10.75"))
        .and(header("User-Agent", "FancyWeatherTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast(22.0, 40.0, 3.0)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server.uri()), "/api/weather?lat=59.91&lon=10.75").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, forecast(22.0, 40.0, 3.0));
}

#[tokio::test]
async fn test_weather_upstream_error_becomes_500_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_string("lat out of range"))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server.uri()), "/api/weather?lat=99&lon=10").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Forecast service error", "details": "lat out of range"})
    );
}

#[tokio::test]
async fn test_weather_network_failure_is_internal_error() {
    // Nothing listens on the discard port
    let (status, body) = get(app_for("http://127.0.0.1:9"), "/api/weather?lat=59.91&lon=10.75").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal error"}));
}

#[tokio::test]
async fn test_geocode_without_city_is_bad_request() {
    let (status, body) = get(app_for("http://127.0.0.1:9"), "/api/geocode").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing city param"}));
}

#[tokio::test]
async fn test_geocode_relays_upstream_array() {
    let server = MockServer::start().await;
    let places = json!([{"lat": "59.9", "lon": "10.7", "display_name": "Oslo, Norway"}]);
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("city", "Oslo"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(places.clone()))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server.uri()), "/api/geocode?city=Oslo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, places);
}

#[tokio::test]
async fn test_geocode_failure_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server.uri()), "/api/geocode?city=Oslo").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Geocoding error"}));
}

#[tokio::test]
async fn test_conditions_default_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("lat", "59.91"))
        .and(query_param("lon", "10.75"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast(22.0, 40.0, 3.0)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server.uri()), "/api/conditions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "Clear");
    assert_eq!(body["icon"], "sunny");
    assert_eq!(body["temperature"], "22°");
    assert_eq!(body["humidity"], "40%");
    assert_eq!(body["wind"], "3 km/h");
    assert_eq!(body["location"], "Oslo");
}

#[tokio::test]
async fn test_conditions_for_city_fetches_resolved_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("city", "Oslo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "59.9", "lon": "10.7", "display_name": "Oslo, Norway"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("lat", "59.9"))
        .and(query_param("lon", "10.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast(3.0, 88.0, 5.5)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server.uri()), "/api/conditions?city=Oslo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Oslo, Norway");
    assert_eq!(body["category"], "Rain");
    assert_eq!(body["wind"], "5.5 km/h");
}

#[tokio::test]
async fn test_conditions_unknown_city_skips_weather_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast(1.0, 1.0, 1.0)))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(
        app_for(&server.uri()),
        "/api/conditions?city=NonexistentPlaceXYZ",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Location not found"}));
}

#[tokio::test]
async fn test_conditions_geocodes_once_with_default_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server.uri());
    config.upstream.max_retries = AppConfig::default().upstream.max_retries;
    let upstream = UpstreamClient::new(&config.upstream).unwrap();
    let app = web::app(&config, AppState::new(upstream));

    let (status, _) = get(app, "/api/conditions?city=Oslo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let hits = server.received_requests().await.unwrap().len();
    assert_eq!(hits, 1);
}

#[tokio::test]
async fn test_conditions_rejects_partial_or_invalid_coordinates() {
    let app = app_for("http://127.0.0.1:9");

    let (status, body) = get(app.clone(), "/api/conditions?lat=59.91").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing lat/lon"}));

    let (status, _) = get(app, "/api/conditions?lat=123&lon=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
