//! In-process stand-ins for the host capabilities.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use deck_weather_core::{ActionSettings, Config, Configuration, KeyAction, SettingsSource};
use parking_lot::Mutex;
use std::path::PathBuf;

/// Global settings read from the config file on every request.
#[derive(Debug)]
pub struct FileSettings {
    path: Option<PathBuf>,
}

impl FileSettings {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Config> {
        match &self.path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

#[async_trait]
impl SettingsSource for FileSettings {
    async fn global_settings(&self) -> Result<Configuration> {
        Ok(self.load()?.settings)
    }
}

/// A button that prints its face to stdout.
#[derive(Debug, Default)]
pub struct ConsoleKey {
    settings: Mutex<ActionSettings>,
    image: Mutex<String>,
}

impl ConsoleKey {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Collapse the multi-line key title onto one terminal line.
fn one_line(title: &str) -> String {
    title
        .split('\n')
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[async_trait]
impl KeyAction for ConsoleKey {
    fn id(&self) -> &str {
        "console"
    }

    async fn settings(&self) -> Result<ActionSettings> {
        Ok(self.settings.lock().clone())
    }

    async fn set_settings(&self, settings: ActionSettings) -> Result<()> {
        *self.settings.lock() = settings;
        Ok(())
    }

    async fn set_image(&self, path: &str) -> Result<()> {
        *self.image.lock() = path.to_string();
        Ok(())
    }

    async fn set_title(&self, title: &str) -> Result<()> {
        let image = self.image.lock().clone();
        println!("{} [{}] {}", Local::now().format("%H:%M:%S"), image, one_line(title));
        Ok(())
    }
}
