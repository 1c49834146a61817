//! Location Resolution Module
//!
//! Turns a free-text place name into a coordinate and a display label using
//! the geocoding service. One attempt per call, nothing is cached.

use std::sync::Arc;

use crate::models::GeocodeMatch;
use crate::upstream::GeocodingService;
use crate::{Result, WeatherAppError};
use tracing::debug;

/// Service for resolving place names
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn GeocodingService>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn GeocodingService>) -> Self {
        Self { geocoder }
    }

    /// Resolve a place name to its first geocoding match
    pub async fn resolve(&self, place_name: &str) -> Result<GeocodeMatch> {
        let name = place_name.trim();
        if name.is_empty() {
            return Err(WeatherAppError::validation("Location cannot be empty"));
        }

        debug!("Geocoding location name: {}", name);
        let matches = self.geocoder.search(name).await?;

        // Upstream order is kept; the first entry wins
        let Some(found) = matches.into_iter().next() else {
            debug!("No geocoding results for {}", name);
            return Err(WeatherAppError::not_found(name));
        };

        debug!(
            "Found location: {} ({:.4}, {:.4})",
            found.display_label, found.coordinate.latitude, found.coordinate.longitude
        );
        Ok(found)
    }
}
