//! `FancyWeather` - weather display backend
//!
//! Proxies MET Norway forecasts and Nominatim geocoding, and turns the
//! current reading into a themed view model.

pub mod api;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod session;
pub mod upstream;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::AppConfig;
pub use error::{ErrorBody, WeatherAppError};
pub use location_resolver::LocationResolver;
pub use models::{Coordinate, GeocodeMatch, InstantReading, ViewModel, WeatherCategory};
pub use session::{Phase, SearchState, WeatherSession};
pub use upstream::{ForecastService, GeocodingService, UpstreamClient};
pub use weather::WeatherClassifier;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherAppError>;
