//! Normalization of the user's free-text coordinate pair.

use crate::error::WeatherError;

/// Signed decimal degrees, kept as text for the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

impl Coordinates {
    /// Accepts `"40.71,-74.00"`, `"40.71N, 74.00W"` and `"40.71°N, 74.00°W"`.
    pub fn parse(input: &str) -> Result<Self, WeatherError> {
        let malformed = || WeatherError::MalformedCoordinates(input.to_string());

        let mut parts = input.split(',');
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };

        let lat = normalize_degrees(lat).ok_or_else(malformed)?;
        let lon = normalize_degrees(lon).ok_or_else(malformed)?;

        Ok(Self { lat, lon })
    }
}

fn normalize_degrees(raw: &str) -> Option<String> {
    let value = strip_degree(raw);

    let negative = match value.chars().last()? {
        'N' | 'n' | 'E' | 'e' => Some(false),
        'S' | 's' | 'W' | 'w' => Some(true),
        _ => None,
    };

    let normalized = match negative {
        Some(negative) => {
            // hemisphere letters are ASCII, so dropping one byte is safe
            let magnitude = strip_degree(&value[..value.len() - 1]).trim_start_matches(['+', '-']);
            if negative {
                format!("-{magnitude}")
            } else {
                magnitude.to_string()
            }
        }
        None => value.to_string(),
    };

    match normalized.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(normalized),
        _ => None,
    }
}

fn strip_degree(raw: &str) -> &str {
    raw.trim().trim_end_matches('°').trim_end()
}
