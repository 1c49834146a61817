//! Location model for geographic coordinates and geocoding matches

use serde::{Deserialize, Serialize};

use crate::{Result, WeatherAppError};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees, -90..=90
    pub latitude: f64,
    /// Longitude in decimal degrees, -180..=180
    pub longitude: f64,
}

impl Coordinate {
    /// Default location shown before the first search
    pub const OSLO: Coordinate = Coordinate {
        latitude: 59.91,
        longitude: 10.75,
    };

    /// Label shown alongside [`Coordinate::OSLO`]
    pub const OSLO_LABEL: &'static str = "Oslo";

    /// Create a coordinate, rejecting out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherAppError::validation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherAppError::validation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Result of resolving a free-text place name
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coordinate: Coordinate,
    /// Human-readable label, e.g. "Oslo, Norway"
    pub display_label: String,
}

impl GeocodeMatch {
    #[must_use]
    pub fn new(coordinate: Coordinate, display_label: impl Into<String>) -> Self {
        Self {
            coordinate,
            display_label: display_label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.01, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_oslo_default() {
        let oslo = Coordinate::new(59.91, 10.75).unwrap();
        assert_eq!(oslo, Coordinate::OSLO);
        assert_eq!(oslo.format_coordinates(), "59.9100, 10.7500");
    }
}
