use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shown in place of any value the reading does not carry
pub const PLACEHOLDER: &str = "--";

/// The subset of a forecast entry that the display consumes
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct InstantReading {
    /// Air temperature in Celsius
    pub air_temperature: Option<f64>,
    /// Relative humidity in percent
    pub relative_humidity: Option<f64>,
    /// Wind speed, shown as km/h
    pub wind_speed: Option<f64>,
}

/// Coarse category derived from the temperature alone
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCategory {
    Clear,
    Clouds,
    Rain,
    Snow,
}

impl WeatherCategory {
    /// Map a temperature to a category. Checks run in order and the first
    /// match wins: `> 20` Clear, `> 5` Clouds, `<= 0` Snow, otherwise Rain.
    /// A missing (or NaN) temperature fails every comparison and lands on Rain.
    #[must_use]
    pub fn classify(temperature: Option<f64>) -> Self {
        match temperature {
            Some(t) if t > 20.0 => WeatherCategory::Clear,
            Some(t) if t > 5.0 => WeatherCategory::Clouds,
            Some(t) if t <= 0.0 => WeatherCategory::Snow,
            _ => WeatherCategory::Rain,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Clear => "Clear",
            WeatherCategory::Clouds => "Clouds",
            WeatherCategory::Rain => "Rain",
            WeatherCategory::Snow => "Snow",
        }
    }

    #[must_use]
    pub fn icon_key(&self) -> &'static str {
        match self {
            WeatherCategory::Clear => "sunny",
            WeatherCategory::Clouds => "cloudy",
            WeatherCategory::Rain => "rainy",
            WeatherCategory::Snow => "snowy",
        }
    }

    #[must_use]
    pub fn gradient_key(&self) -> &'static str {
        match self {
            WeatherCategory::Clear => "orange",
            WeatherCategory::Clouds => "pink-cyan",
            WeatherCategory::Rain => "blue",
            WeatherCategory::Snow => "pale",
        }
    }

    /// CSS background for the category
    #[must_use]
    pub fn gradient_css(&self) -> &'static str {
        match self {
            WeatherCategory::Clear => "linear-gradient(to right, #f3b07c, #fcd283)",
            WeatherCategory::Clouds => "linear-gradient(to right, #f7d6d4, #71eeec)",
            WeatherCategory::Rain => "linear-gradient(to right, #5bc8fb, #80eaff)",
            WeatherCategory::Snow => "linear-gradient(to right, #aff2ff, #fff)",
        }
    }
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the display needs for one location, built in one go
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ViewModel {
    pub category: WeatherCategory,
    pub icon: String,
    pub gradient: String,
    pub gradient_css: String,
    /// Rounded temperature such as `22°`, or `--`
    pub temperature: String,
    /// Such as `40%`, or `--`
    pub humidity: String,
    /// Such as `3 km/h`, or `--`
    pub wind: String,
    /// Such as `Fri, 16, Oct`
    pub date: String,
    pub location: String,
}

impl ViewModel {
    /// Build the view model for a reading
    #[must_use]
    pub fn build(reading: &InstantReading, location: impl Into<String>, today: NaiveDate) -> Self {
        let category = WeatherCategory::classify(reading.air_temperature);

        Self {
            category,
            icon: category.icon_key().to_string(),
            gradient: category.gradient_key().to_string(),
            gradient_css: category.gradient_css().to_string(),
            temperature: format_temperature(reading.air_temperature),
            humidity: format_optional(reading.relative_humidity, "%"),
            wind: format_optional(reading.wind_speed, " km/h"),
            date: format_date(today),
            location: location.into(),
        }
    }
}

/// Round half up, so `-2.5` becomes `-2` and `2.5` becomes `3`
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    // adding 0.5 first loses precision just below a half
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

fn format_temperature(temperature: Option<f64>) -> String {
    match temperature {
        Some(t) if t.is_finite() => format!("{}°", round_half_up(t)),
        _ => PLACEHOLDER.to_string(),
    }
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v}{unit}"))
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%a, %-d, %b").to_string()
}
