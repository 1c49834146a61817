//! HTTP client for the third-party forecast and geocoding services
//!
//! Forecasts come from MET Norway's Locationforecast 2.0 (compact) and place
//! names are resolved through Nominatim. The raw JSON is exposed for the
//! proxy endpoints; the typed [`ForecastService`] and [`GeocodingService`]
//! views feed the resolver and classifier.

use async_trait::async_trait;
use reqwest::{StatusCode, Url, header::USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

use crate::config::UpstreamConfig;
use crate::models::{Coordinate, GeocodeMatch, InstantReading};
use crate::{Result, WeatherAppError};

/// Place-name search
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// All matches for `place`, in upstream order
    async fn search(&self, place: &str) -> Result<Vec<GeocodeMatch>>;
}

/// Current conditions at a coordinate
#[async_trait]
pub trait ForecastService: Send + Sync {
    /// The reading of the first forecast entry
    async fn current_reading(&self, coordinate: Coordinate) -> Result<InstantReading>;
}

/// Client for both upstream services
#[derive(Clone)]
pub struct UpstreamClient {
    /// Forecast requests, retried on transient failures
    http: ClientWithMiddleware,
    /// Geocoding requests, always a single attempt
    geocoder: ClientWithMiddleware,
    forecast_url: String,
    geocode_url: String,
    user_agent: String,
}

impl UpstreamClient {
    /// Create a new client with timeout and retry policy from config
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WeatherAppError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let geocoder = ClientBuilder::new(client).build();

        Ok(Self {
            http,
            geocoder,
            forecast_url: config.forecast_url.clone(),
            geocode_url: config.geocode_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Fetch the forecast for `lat`/`lon` and return the upstream JSON untouched.
    /// The parameters are forwarded exactly as given.
    #[instrument(skip(self))]
    pub async fn forecast_raw(&self, lat: &str, lon: &str) -> Result<Value> {
        let url = build_url(&self.forecast_url, &[("lat", lat), ("lon", lon)])?;
        debug!("Forecast request URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .http
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            error!("Forecast service returned {}: {}", status, details);
            return Err(WeatherAppError::upstream(status.as_u16(), details));
        }

        let body: Value = response.json().await?;
        let elapsed = start_time.elapsed();
        debug!("Forecast received in {:.3}s", elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow forecast response: {:.3}s", elapsed.as_secs_f64());
        }
        Ok(body)
    }

    /// Search Nominatim for `city` and return the upstream JSON untouched
    #[instrument(skip(self))]
    pub async fn geocode_raw(&self, city: &str) -> Result<Value> {
        let url = build_url(&self.geocode_url, &[("city", city), ("format", "json")])?;
        debug!("Geocoding request URL: {}", url);

        let response = self.geocoder.get(url).send().await?;
        if response.status() != StatusCode::OK {
            debug!("Geocoding service returned {}", response.status());
        }

        let body: Value = response.json().await?;
        Ok(body)
    }
}

fn build_url(base: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(base, params)
        .map_err(|e| WeatherAppError::config(format!("Invalid upstream URL '{base}': {e}")))
}

#[async_trait]
impl ForecastService for UpstreamClient {
    async fn current_reading(&self, coordinate: Coordinate) -> Result<InstantReading> {
        let raw = self
            .forecast_raw(
                &coordinate.latitude.to_string(),
                &coordinate.longitude.to_string(),
            )
            .await?;
        metno::current_reading(raw)
    }
}

#[async_trait]
impl GeocodingService for UpstreamClient {
    async fn search(&self, place: &str) -> Result<Vec<GeocodeMatch>> {
        let raw = self.geocode_raw(place).await?;
        nominatim::matches(raw)
    }
}

/// MET Norway Locationforecast payload, reduced to what the display reads
mod metno {
    use super::{InstantReading, Result, Value, WeatherAppError};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Forecast {
        pub properties: Properties,
    }

    #[derive(Debug, Deserialize)]
    pub struct Properties {
        pub timeseries: Vec<TimeStep>,
    }

    #[derive(Debug, Deserialize)]
    pub struct TimeStep {
        pub data: Option<TimeStepData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct TimeStepData {
        pub instant: Option<Instant>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Instant {
        pub details: Option<Details>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Details {
        pub air_temperature: Option<f64>,
        pub relative_humidity: Option<f64>,
        pub wind_speed: Option<f64>,
    }

    /// Take the first time step; later ones are ignored
    pub fn current_reading(raw: Value) -> Result<InstantReading> {
        let forecast: Forecast = serde_json::from_value(raw).map_err(|e| {
            WeatherAppError::upstream(200, format!("Unexpected forecast payload: {e}"))
        })?;

        let details = forecast
            .properties
            .timeseries
            .into_iter()
            .next()
            .and_then(|step| step.data)
            .and_then(|data| data.instant)
            .and_then(|instant| instant.details);

        Ok(details.map_or_else(InstantReading::default, |d| InstantReading {
            air_temperature: d.air_temperature,
            relative_humidity: d.relative_humidity,
            wind_speed: d.wind_speed,
        }))
    }
}

/// Nominatim search results
mod nominatim {
    use super::{Coordinate, GeocodeMatch, Result, Value, WeatherAppError};
    use serde::Deserialize;

    /// Nominatim sends degrees as decimal strings
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum Degrees {
        Text(String),
        Number(f64),
    }

    impl Degrees {
        fn value(&self) -> Option<f64> {
            match self {
                Degrees::Text(text) => text.trim().parse().ok(),
                Degrees::Number(number) => Some(*number),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct Place {
        pub lat: Degrees,
        pub lon: Degrees,
        pub display_name: Option<String>,
    }

    pub fn matches(raw: Value) -> Result<Vec<GeocodeMatch>> {
        let places: Vec<Place> = serde_json::from_value(raw).map_err(|e| {
            WeatherAppError::upstream(200, format!("Unexpected geocoding payload: {e}"))
        })?;

        places
            .into_iter()
            .map(|place| {
                let (Some(lat), Some(lon)) = (place.lat.value(), place.lon.value()) else {
                    return Err(WeatherAppError::upstream(
                        200,
                        "Geocoding match without usable coordinates",
                    ));
                };
                let coordinate = Coordinate::new(lat, lon)
                    .map_err(|e| WeatherAppError::upstream(200, e.to_string()))?;
                let label = place
                    .display_name
                    .unwrap_or_else(|| coordinate.format_coordinates());
                Ok(GeocodeMatch::new(coordinate, label))
            })
            .collect()
    }
}
