use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::{config::ProviderConfig, coordinates::Coordinates, error::WeatherError, model::Reading};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, api_key: &str, coordinates: &str) -> Result<Reading, WeatherError> {
        let coords = Coordinates::parse(coordinates)?;
        let url = format!("{}/weather", self.base_url);

        info!(lat = %coords.lat, lon = %coords.lon, "Fetching weather data");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.lat.as_str()),
                ("lon", coords.lon.as_str()),
                ("appid", api_key),
                ("units", "imperial"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Upstream(format!("Failed to send request to OpenWeather: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Upstream(format!("Failed to read OpenWeather response body: {e}")))?;

        if !status.is_success() {
            return Err(WeatherError::Upstream(format!(
                "OpenWeather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Upstream(format!("Failed to parse OpenWeather JSON: {e}")))?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Upstream("OpenWeather response contained no weather entry".into()))?;

        debug!(icon = %condition.icon, description = %condition.description, "OpenWeather response parsed");

        Ok(Reading {
            temperature_f: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_mph: parsed.wind.speed,
            description: condition.description,
            icon_code: condition.icon,
            fetched_at: Some(Utc::now()),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
