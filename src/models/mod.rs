//! Data models for the FancyWeather backend
//!
//! - Location: coordinates and geocoding matches
//! - Weather: instant readings, the derived category and the view model

pub mod location;
pub mod weather;

pub use location::{Coordinate, GeocodeMatch};
pub use weather::{InstantReading, ViewModel, WeatherCategory};
