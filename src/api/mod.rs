use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::location_resolver::LocationResolver;
use crate::models::{Coordinate, ViewModel};
use crate::upstream::UpstreamClient;
use crate::weather::WeatherClassifier;
use crate::{ErrorBody, WeatherAppError};

type ApiError = (StatusCode, Json<ErrorBody>);

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub resolver: LocationResolver,
    pub classifier: WeatherClassifier,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        let shared = Arc::new(upstream.clone());
        Self {
            upstream,
            resolver: LocationResolver::new(shared.clone()),
            classifier: WeatherClassifier::new(shared),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConditionsQuery {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/geocode", get(get_geocode))
        .route("/conditions", get(get_conditions))
        .with_state(state)
}

/// Empty parameters count as missing
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(ErrorBody::new(message)))
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(lat), Some(lon)) = (present(query.lat), present(query.lon)) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing lat/lon"));
    };

    match state.upstream.forecast_raw(&lat, &lon).await {
        Ok(body) => Ok(Json(body)),
        Err(WeatherAppError::Upstream { details, .. }) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::with_details("Forecast service error", details)),
        )),
        Err(err) => {
            error!("Forecast proxy failed: {}", err);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

async fn get_geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(city) = present(query.city) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing city param"));
    };

    state.upstream.geocode_raw(&city).await.map(Json).map_err(|err| {
        error!("Geocoding proxy failed: {}", err);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Geocoding error")
    })
}

/// Resolve (optionally) and classify server-side, returning the view model
async fn get_conditions(
    State(state): State<AppState>,
    Query(query): Query<ConditionsQuery>,
) -> Result<Json<ViewModel>, WeatherAppError> {
    if let Some(city) = present(query.city) {
        let found = state.resolver.resolve(&city).await?;
        let view = state
            .classifier
            .fetch_and_classify(found.coordinate, &found.display_label)
            .await?;
        return Ok(Json(view));
    }

    let (coordinate, label) = match (present(query.lat), present(query.lon)) {
        (None, None) => (Coordinate::OSLO, Coordinate::OSLO_LABEL.to_string()),
        (Some(lat), Some(lon)) => {
            let coordinate = Coordinate::new(parse_degrees("lat", &lat)?, parse_degrees("lon", &lon)?)?;
            (coordinate, coordinate.format_coordinates())
        }
        _ => return Err(WeatherAppError::missing_parameter("Missing lat/lon")),
    };

    let view = state.classifier.fetch_and_classify(coordinate, &label).await?;
    Ok(Json(view))
}

fn parse_degrees(name: &str, value: &str) -> Result<f64, WeatherAppError> {
    value
        .trim()
        .parse()
        .map_err(|_| WeatherAppError::validation(format!("{name} must be a number")))
}
