//! Core library for the deck weather button.
//!
//! This crate defines:
//! - Configuration loading and the host settings shape
//! - The OpenWeather provider and coordinate normalization
//! - Settings/weather caches and the fetch throttle
//! - Per-button refresh scheduling and key rendering
//!
//! It is used by `deck-weather-cli`, but any host that implements
//! [`SettingsSource`] and [`KeyAction`] can drive it.

pub mod cache;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod host;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod render;
pub mod scheduler;
pub mod throttle;
pub mod timer;

pub use cache::{SettingsCache, WeatherCache};
pub use config::{Config, ProviderConfig};
pub use coordinates::Coordinates;
pub use error::{MissingField, WeatherError};
pub use host::{ActionSettings, KeyAction, SettingsSource, TimerId};
pub use model::{Configuration, Reading};
pub use provider::{WeatherProvider, provider_from_config};
pub use refresh::PluginContext;
pub use render::KeyFace;
pub use scheduler::{RefreshScheduler, SharedAction, TimerState, Trigger};
pub use throttle::{Clock, FetchThrottle, SystemClock};
pub use timer::TimerRegistry;
