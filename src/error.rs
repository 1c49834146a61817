//! Error types and handling for the FancyWeather backend

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the FancyWeather backend
#[derive(Error, Debug)]
pub enum WeatherAppError {
    /// A required query parameter was absent or empty
    #[error("Missing parameter: {message}")]
    MissingParameter { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Geocoding returned zero matches
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// Upstream answered with a non-success status or an unusable payload
    #[error("Upstream error ({status}): {details}")]
    Upstream { status: u16, details: String },

    /// Network failure, timeout or undecodable body
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherAppError {
    /// Create a new missing parameter error
    pub fn missing_parameter<S: Into<String>>(message: S) -> Self {
        Self::MissingParameter {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(status: u16, details: S) -> Self {
        Self::Upstream {
            status,
            details: details.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherAppError::MissingParameter { message } => message.clone(),
            WeatherAppError::Validation { message } => format!("Invalid input: {message}"),
            WeatherAppError::NotFound { .. } => "Location not found".to_string(),
            WeatherAppError::Upstream { .. } | WeatherAppError::Transport { .. } => {
                "Unable to reach the weather services. Please try again later.".to_string()
            }
            WeatherAppError::Config { .. } => {
                "Configuration error. Please check the environment settings.".to_string()
            }
        }
    }

    /// HTTP status used when this error crosses the web boundary
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            WeatherAppError::MissingParameter { .. } | WeatherAppError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            WeatherAppError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for WeatherAppError {
    fn from(err: reqwest::Error) -> Self {
        WeatherAppError::transport(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for WeatherAppError {
    fn from(err: reqwest_middleware::Error) -> Self {
        WeatherAppError::transport(err.to_string())
    }
}

/// Uniform JSON error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details<S: Into<String>, D: Into<String>>(error: S, details: D) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for WeatherAppError {
    fn into_response(self) -> Response {
        // Upstream payloads stay in the logs, never in the response
        (self.status_code(), Json(ErrorBody::new(self.user_message()))).into_response()
    }
}
