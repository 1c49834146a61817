//! Configuration management for the FancyWeather backend
//!
//! Settings come from the process environment. `PORT` overrides the listen
//! port; everything else is read from `FANCY_WEATHER_<SECTION>__<KEY>`
//! variables (for example `FANCY_WEATHER_UPSTREAM__TIMEOUT_SECONDS`) and
//! falls back to the defaults below.

use crate::{Result, WeatherAppError};
use ::config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "FANCY_WEATHER";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Third-party service settings
    pub upstream: UpstreamConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with a built frontend, served for unmatched paths
    pub static_dir: Option<String>,
}

/// Third-party service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// MET Norway compact forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Nominatim search endpoint
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    /// Identifying User-Agent, required by MET Norway's terms of service
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_forecast_url() -> String {
    "https://api.met.no/weatherapi/locationforecast/2.0/compact".to_string()
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_user_agent() -> String {
    concat!("FancyWeather/", env!("CARGO_PKG_VERSION"), " (ops@fancyweather.example)").to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                static_dir: None,
            },
            upstream: UpstreamConfig {
                forecast_url: default_forecast_url(),
                geocode_url: default_geocode_url(),
                user_agent: default_user_agent(),
                timeout_seconds: default_timeout(),
                max_retries: default_max_retries(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
            },
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build a configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let port = vars.get("PORT").cloned();

        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;

        // FANCY_WEATHER_UPSTREAM__MAX_RETRIES -> upstream.max_retries
        let settings = Config::builder()
            .add_source(defaults)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.into_iter().collect())),
            )
            .set_override_option("server.port", port)
            .map_err(config_error)?
            .build()
            .map_err(config_error)?;

        let mut config: AppConfig = settings.try_deserialize().map_err(config_error)?;

        config.logging.level = config.logging.level.to_lowercase();
        config.server.static_dir = config.server.static_dir.filter(|d| !d.is_empty());

        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Socket address string the server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply default values to empty fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.upstream.forecast_url.is_empty() {
            self.upstream.forecast_url = default_forecast_url();
        }
        if self.upstream.geocode_url.is_empty() {
            self.upstream.geocode_url = default_geocode_url();
        }
        if self.upstream.user_agent.is_empty() {
            self.upstream.user_agent = default_user_agent();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.upstream.timeout_seconds > 300 {
            return Err(WeatherAppError::config(
                "Upstream timeout cannot exceed 300 seconds",
            ));
        }

        if self.upstream.max_retries > 10 {
            return Err(WeatherAppError::config("Upstream max retries cannot exceed 10"));
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherAppError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        for (name, url) in [
            ("forecast", &self.upstream.forecast_url),
            ("geocode", &self.upstream.geocode_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherAppError::config(format!(
                    "The {name} URL must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        Ok(())
    }
}

fn config_error(err: ConfigError) -> WeatherAppError {
    WeatherAppError::config(format!("Failed to load configuration: {err}"))
}
