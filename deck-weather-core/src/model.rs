use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Global user settings, keyed the way the host persists them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(rename = "openweatherApiKey")]
    pub api_key: String,

    /// Free-text pair such as `"40.71,-74.00"` or `"40.71N, 74.00W"`.
    #[serde(rename = "latLong")]
    pub coordinates: String,

    /// Minutes between automatic refreshes; 0 disables.
    #[serde(rename = "refreshTime", deserialize_with = "lenient_minutes")]
    pub refresh_minutes: u32,
}

impl Configuration {
    pub fn new(api_key: impl Into<String>, coordinates: impl Into<String>, refresh_minutes: u32) -> Self {
        Self {
            api_key: api_key.into(),
            coordinates: coordinates.into(),
            refresh_minutes,
        }
    }
}

/// Property inspectors hand numbers back as text; anything unusable means disabled.
///
/// Fractional minutes are truncated to whole minutes.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Minutes {
        Number(f64),
        Text(String),
    }

    let minutes = match Option::<Minutes>::deserialize(deserializer)? {
        Some(Minutes::Number(n)) => n,
        Some(Minutes::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };

    if minutes.is_finite() && minutes > 0.0 {
        Ok(minutes.min(u32::MAX as f64) as u32)
    } else {
        Ok(0)
    }
}

/// A single current-conditions snapshot in imperial units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature_f: f64,
    pub humidity_pct: u8,
    pub wind_mph: f64,
    pub description: String,
    pub icon_code: String,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Reading {
    /// True for the startup sentinel. A genuine 0°F / 0% reading also matches.
    pub fn is_unset(&self) -> bool {
        self.temperature_f == 0.0 && self.humidity_pct == 0
    }
}
