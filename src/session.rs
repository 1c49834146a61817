//! Search session state machine
//!
//! [`SearchState`] is an immutable value: every transition returns a new
//! state. Each search or coordinate load is issued a [`Ticket`]; results
//! carrying anything but the latest ticket are dropped, so a slow response
//! can never overwrite a newer one.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::WeatherAppError;
use crate::location_resolver::LocationResolver;
use crate::models::{Coordinate, ViewModel};
use crate::weather::WeatherClassifier;

pub const LOCATION_NOT_FOUND: &str = "Location not found.";
pub const LOCATION_FAILED: &str = "Could not resolve location.";
pub const WEATHER_FAILED: &str = "Could not fetch weather data.";

/// What the display currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Displaying(ViewModel),
    Error(String),
}

/// Identifies one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub phase: Phase,
    /// Contents of the search box
    pub input: String,
    /// Label of the last resolved location, kept apart from the input
    pub display_label: String,
    issued: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            input: String::new(),
            display_label: Coordinate::OSLO_LABEL.to_string(),
            issued: 0,
        }
    }
}

impl SearchState {
    #[must_use]
    pub fn with_input(&self, text: impl Into<String>) -> Self {
        Self {
            input: text.into(),
            ..self.clone()
        }
    }

    /// Enter Loading and issue a fresh ticket
    #[must_use]
    pub fn begin(&self) -> (Self, Ticket) {
        let ticket = Ticket(self.issued + 1);
        let next = Self {
            phase: Phase::Loading,
            issued: ticket.0,
            ..self.clone()
        };
        (next, ticket)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// A place name resolved: adopt its label and clear the search box
    #[must_use]
    pub fn resolved(&self, ticket: Ticket, label: &str) -> Self {
        if !self.is_current(ticket) {
            return self.clone();
        }
        Self {
            display_label: label.to_string(),
            input: String::new(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn displayed(&self, ticket: Ticket, view: ViewModel) -> Self {
        if !self.is_current(ticket) {
            return self.clone();
        }
        Self {
            phase: Phase::Displaying(view),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn failed(&self, ticket: Ticket, message: impl Into<String>) -> Self {
        if !self.is_current(ticket) {
            return self.clone();
        }
        Self {
            phase: Phase::Error(message.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<&ViewModel> {
        match &self.phase {
            Phase::Displaying(view) => Some(view),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}

/// Drives a [`SearchState`] through resolve and fetch
pub struct WeatherSession {
    resolver: LocationResolver,
    classifier: WeatherClassifier,
    state: Mutex<SearchState>,
}

impl WeatherSession {
    pub fn new(resolver: LocationResolver, classifier: WeatherClassifier) -> Self {
        Self {
            resolver,
            classifier,
            state: Mutex::new(SearchState::default()),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, transition: impl FnOnce(&SearchState) -> SearchState) -> SearchState {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = transition(&*guard);
        guard.clone()
    }

    fn begin(&self) -> (Ticket, SearchState) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, ticket) = guard.begin();
        *guard = next;
        (ticket, guard.clone())
    }

    pub fn set_input(&self, text: impl Into<String>) -> SearchState {
        let text = text.into();
        self.update(|state| state.with_input(text))
    }

    /// Initial load for the default location
    pub async fn load_default(&self) -> SearchState {
        self.load_coordinates(Coordinate::OSLO).await
    }

    /// Fetch weather for a known coordinate under the current label
    pub async fn load_coordinates(&self, coordinate: Coordinate) -> SearchState {
        let (ticket, started) = self.begin();
        self.fetch_weather(ticket, coordinate, &started.display_label)
            .await
    }

    /// Search for the place typed in the input. Blank input does nothing.
    pub async fn search(&self) -> SearchState {
        let current = self.state();
        let query = current.input.trim().to_string();
        if query.is_empty() {
            return current;
        }

        let (ticket, _) = self.begin();
        match self.resolver.resolve(&query).await {
            Ok(found) => {
                self.update(|state| state.resolved(ticket, &found.display_label));
                self.fetch_weather(ticket, found.coordinate, &found.display_label)
                    .await
            }
            Err(err) => {
                warn!("Geocoding failed for {}: {}", query, err);
                let message = match err {
                    WeatherAppError::NotFound { .. } => LOCATION_NOT_FOUND,
                    _ => LOCATION_FAILED,
                };
                self.update(|state| state.failed(ticket, message))
            }
        }
    }

    /// Key events from the search box; only Enter starts a search
    pub async fn handle_key(&self, key: &str) -> SearchState {
        if key == "Enter" {
            self.search().await
        } else {
            self.state()
        }
    }

    async fn fetch_weather(&self, ticket: Ticket, coordinate: Coordinate, label: &str) -> SearchState {
        match self.classifier.fetch_and_classify(coordinate, label).await {
            Ok(view) => {
                info!("Showing {} for {}", view.category, label);
                self.update(|state| state.displayed(ticket, view))
            }
            Err(err) => {
                warn!("Weather fetch failed for {}: {}", label, err);
                self.update(|state| state.failed(ticket, WEATHER_FAILED))
            }
        }
    }
}
