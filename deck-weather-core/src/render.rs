//! What a button shows for a reading or a failure.

use crate::model::Reading;

const IMAGE_DIR: &str = "imgs/actions/weather";

/// Icon codes published by OpenWeather, day and night variants.
pub const VALID_ICONS: [&str; 18] = [
    "01d", "01n", "02d", "02n", "03d", "03n", "04d", "04n", "09d", "09n", "10d", "10n", "11d",
    "11n", "13d", "13n", "50d", "50n",
];

/// Image and title pushed to the host in one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFace {
    pub image: String,
    pub title: String,
}

impl KeyFace {
    pub fn reading(reading: &Reading) -> Self {
        Self {
            image: image_for_icon(&reading.icon_code),
            title: title(reading),
        }
    }

    pub fn error(image: String, message: &str) -> Self {
        Self {
            image,
            title: error_title(message),
        }
    }
}

pub fn image_for_icon(code: &str) -> String {
    if VALID_ICONS.contains(&code) {
        format!("{IMAGE_DIR}/{code}")
    } else {
        unknown_image()
    }
}

pub fn unknown_image() -> String {
    format!("{IMAGE_DIR}/unknown")
}

pub fn title(reading: &Reading) -> String {
    format!(
        "{}°, {}%\n\n\n\n{} mph",
        round_tenths(reading.temperature_f),
        reading.humidity_pct,
        round_tenths(reading.wind_mph),
    )
}

pub fn error_title(message: &str) -> String {
    format!("\n\n\n\n{message}")
}

/// Halves round toward positive infinity, so -2.25 becomes -2.2.
fn round_tenths(value: f64) -> f64 {
    // adding 0.0 turns -0.0 into 0.0
    (value * 10.0 + 0.5).floor() / 10.0 + 0.0
}
