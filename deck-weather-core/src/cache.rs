//! Single-slot caches shared by the lifecycle callbacks and timer ticks.
//!
//! Each cache guards its value with a short-lived lock; no lock is ever held
//! across an `.await`.

use parking_lot::Mutex;
use tracing::info;

use crate::model::{Configuration, Reading};

/// Last-seen global settings with change detection.
#[derive(Debug, Default)]
pub struct SettingsCache {
    current: Mutex<Configuration>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> Configuration {
        self.current.lock().clone()
    }

    /// Replace the cached settings if any tracked field differs.
    ///
    /// Returns whether a replacement happened.
    pub fn update(&self, next: Configuration) -> bool {
        info!(refresh_minutes = next.refresh_minutes, "Memoizing settings");

        let mut current = self.current.lock();
        let changed = current.refresh_minutes != next.refresh_minutes
            || current.api_key != next.api_key
            || current.coordinates != next.coordinates;

        if changed {
            info!("New settings detected");
            *current = next;
        } else {
            info!("Existing settings detected");
        }

        changed
    }
}

/// Latest reading, served whenever a fetch is throttled.
#[derive(Debug, Default)]
pub struct WeatherCache {
    latest: Mutex<Reading>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> Reading {
        self.latest.lock().clone()
    }

    pub fn write(&self, next: Reading) {
        info!(temperature_f = next.temperature_f, "Memoizing weather data");
        *self.latest.lock() = next;
    }

    pub fn is_empty(&self) -> bool {
        self.latest.lock().is_unset()
    }
}
