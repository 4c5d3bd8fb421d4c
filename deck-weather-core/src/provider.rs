use crate::{Config, Reading, WeatherError, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current conditions for a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// `coordinates` is the raw user text; implementations normalize it.
    async fn fetch_current(&self, api_key: &str, coordinates: &str) -> Result<Reading, WeatherError>;
}

/// Construct the OpenWeather provider from the `[provider]` section of the config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::new(&config.provider)?;
    Ok(Arc::new(provider))
}
