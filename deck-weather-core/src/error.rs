use std::fmt;
use thiserror::Error;

/// User setting whose absence blocks a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    ApiKey,
    Coordinates,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::ApiKey => f.write_str("API key"),
            MissingField::Coordinates => f.write_str("coordinates"),
        }
    }
}

/// Failures the refresh path knows how to render.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// A required user setting is empty. Rendered inline, never retried.
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(MissingField),

    /// Network, status or parse failure talking to the weather provider.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The coordinate string could not be normalized into a lat/lon pair.
    #[error("Malformed coordinates: '{0}'")]
    MalformedCoordinates(String),
}

impl WeatherError {
    /// Text shown under the icon for this failure.
    pub fn label(&self) -> &'static str {
        match self {
            WeatherError::ConfigurationMissing(MissingField::ApiKey) => "API Key?",
            WeatherError::ConfigurationMissing(MissingField::Coordinates) => "Lat/Long?",
            WeatherError::Upstream(_) | WeatherError::MalformedCoordinates(_) => "Error!",
        }
    }
}
