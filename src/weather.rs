use std::sync::Arc;

use chrono::Local;
use tracing::instrument;

use crate::Result;
use crate::models::{Coordinate, ViewModel};
use crate::upstream::ForecastService;

/// Fetches current conditions and turns them into a [`ViewModel`]
#[derive(Clone)]
pub struct WeatherClassifier {
    forecasts: Arc<dyn ForecastService>,
}

impl WeatherClassifier {
    pub fn new(forecasts: Arc<dyn ForecastService>) -> Self {
        Self { forecasts }
    }

    /// Fetch the reading at `coordinate` and build the view model. Any
    /// failure is returned as is; no partial view model is produced.
    #[instrument(skip(self))]
    pub async fn fetch_and_classify(&self, coordinate: Coordinate, location: &str) -> Result<ViewModel> {
        let reading = self.forecasts.current_reading(coordinate).await?;
        let view = ViewModel::build(&reading, location, Local::now().date_naive());
        tracing::debug!(
            "Classified {} as {} ({})",
            coordinate.format_coordinates(),
            view.category,
            view.temperature
        );
        Ok(view)
    }
}
