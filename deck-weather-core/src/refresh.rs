use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    cache::{SettingsCache, WeatherCache},
    error::{MissingField, WeatherError},
    host::KeyAction,
    model::Reading,
    provider::WeatherProvider,
    render::{self, KeyFace},
    throttle::{Clock, FetchThrottle, SystemClock},
};

/// Process-wide state shared by every lifecycle callback and timer tick.
#[derive(Debug)]
pub struct PluginContext {
    pub settings: SettingsCache,
    pub weather: WeatherCache,
    pub throttle: FetchThrottle,
    provider: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
}

impl PluginContext {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock))
    }

    pub fn with_clock(provider: Arc<dyn WeatherProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings: SettingsCache::new(),
            weather: WeatherCache::new(),
            throttle: FetchThrottle::new(),
            provider,
            clock,
        }
    }

    /// Render the current reading (or the reason there is none) onto `action`.
    ///
    /// Never fails: every outcome ends in a rendered face, which is also returned.
    pub async fn refresh(&self, action: &dyn KeyAction, from_interval: bool) -> KeyFace {
        info!(action = action.id(), from_interval, "Setting key info");

        let face = match self.current_reading().await {
            Ok(reading) => KeyFace::reading(&reading),
            Err(err) => {
                warn!(action = action.id(), error = %err, "Rendering error state");
                KeyFace::error(self.fallback_image(&err), err.label())
            }
        };

        if let Err(e) = action.set_image(&face.image).await {
            warn!(action = action.id(), error = %e, "Failed to set key image");
        }
        if let Err(e) = action.set_title(&face.title).await {
            warn!(action = action.id(), error = %e, "Failed to set key title");
        }

        face
    }

    async fn current_reading(&self) -> Result<Reading, WeatherError> {
        let config = self.settings.read();

        if config.api_key.is_empty() {
            return Err(WeatherError::ConfigurationMissing(MissingField::ApiKey));
        }
        if config.coordinates.is_empty() {
            return Err(WeatherError::ConfigurationMissing(MissingField::Coordinates));
        }

        // Two callbacks may both get here before either writes the cache; one
        // redundant fetch is tolerated.
        let now = self.clock.now_millis();
        if self.throttle.permit(now) || self.weather.is_empty() {
            let reading = self
                .provider
                .fetch_current(&config.api_key, &config.coordinates)
                .await?;
            self.weather.write(reading);
        }

        Ok(self.weather.read())
    }

    fn fallback_image(&self, err: &WeatherError) -> String {
        match err {
            WeatherError::ConfigurationMissing(_) => render::unknown_image(),
            WeatherError::Upstream(_) | WeatherError::MalformedCoordinates(_) => {
                render::image_for_icon(&self.weather.read().icon_code)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::host::ActionSettings;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    /// Clock that only moves when told to.
    #[derive(Debug, Default)]
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(millis: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(millis)))
        }

        pub fn advance(&self, millis: i64) {
            self.0.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Provider double that counts calls and replays a fixed outcome.
    #[derive(Debug)]
    pub struct CountingProvider {
        pub calls: AtomicUsize,
        outcome: Mutex<Result<Reading, String>>,
    }

    impl CountingProvider {
        pub fn returning(reading: Reading) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome: Mutex::new(Ok(reading)),
            })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome: Mutex::new(Err(message.to_string())),
            })
        }

        pub fn fail_from_now(&self, message: &str) {
            *self.outcome.lock() = Err(message.to_string());
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn fetch_current(&self, _api_key: &str, _coordinates: &str) -> Result<Reading, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.lock().clone().map_err(WeatherError::Upstream)
        }
    }

    /// Button double that remembers everything the plugin did to it.
    #[derive(Debug, Default)]
    pub struct RecordingAction {
        pub id: String,
        pub settings: Mutex<ActionSettings>,
        pub images: Mutex<Vec<String>>,
        pub titles: Mutex<Vec<String>>,
    }

    impl RecordingAction {
        pub fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                ..Self::default()
            })
        }

        pub fn last_title(&self) -> Option<String> {
            self.titles.lock().last().cloned()
        }

        pub fn last_image(&self) -> Option<String> {
            self.images.lock().last().cloned()
        }
    }

    #[async_trait]
    impl KeyAction for RecordingAction {
        fn id(&self) -> &str {
            &self.id
        }

        async fn settings(&self) -> anyhow::Result<ActionSettings> {
            Ok(self.settings.lock().clone())
        }

        async fn set_settings(&self, settings: ActionSettings) -> anyhow::Result<()> {
            *self.settings.lock() = settings;
            Ok(())
        }

        async fn set_image(&self, path: &str) -> anyhow::Result<()> {
            self.images.lock().push(path.to_string());
            Ok(())
        }

        async fn set_title(&self, title: &str) -> anyhow::Result<()> {
            self.titles.lock().push(title.to_string());
            Ok(())
        }
    }

    pub fn sample_reading() -> Reading {
        Reading {
            temperature_f: 72.34,
            humidity_pct: 55,
            wind_mph: 4.26,
            description: "broken clouds".to_string(),
            icon_code: "04d".to_string(),
            fetched_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::model::Configuration;

    fn context_with(provider: Arc<CountingProvider>, config: Configuration) -> PluginContext {
        context_at(provider, config, ManualClock::at(1_700_000_000_000))
    }

    fn context_at(
        provider: Arc<CountingProvider>,
        config: Configuration,
        clock: Arc<ManualClock>,
    ) -> PluginContext {
        let context = PluginContext::with_clock(provider, clock);
        context.settings.update(config);
        context
    }

    #[tokio::test]
    async fn missing_api_key_renders_prompt_without_fetching() {
        let provider = CountingProvider::returning(sample_reading());
        let context = context_with(provider.clone(), Configuration::new("", "1,2", 0));
        let action = RecordingAction::new("key-1");

        let face = context.refresh(action.as_ref(), false).await;

        assert_eq!(face.title, "\n\n\n\nAPI Key?");
        assert_eq!(face.image, "imgs/actions/weather/unknown");
        assert_eq!(action.last_title().as_deref(), Some("\n\n\n\nAPI Key?"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn missing_coordinates_renders_prompt_without_fetching() {
        let provider = CountingProvider::returning(sample_reading());
        let context = context_with(provider.clone(), Configuration::new("KEY", "", 0));
        let action = RecordingAction::new("key-1");

        let face = context.refresh(action.as_ref(), false).await;

        assert_eq!(face.title, "\n\n\n\nLat/Long?");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn successful_fetch_renders_and_caches() {
        let provider = CountingProvider::returning(sample_reading());
        let context = context_with(provider.clone(), Configuration::new("KEY", "1,2", 0));
        let action = RecordingAction::new("key-1");

        let face = context.refresh(action.as_ref(), false).await;

        assert_eq!(face.title, "72.3°, 55%\n\n\n\n4.3 mph");
        assert_eq!(face.image, "imgs/actions/weather/04d");
        assert_eq!(action.last_image().as_deref(), Some("imgs/actions/weather/04d"));
        assert!(!context.weather.is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn throttled_refresh_serves_cached_reading() {
        let provider = CountingProvider::returning(sample_reading());
        let context = context_with(provider.clone(), Configuration::new("KEY", "1,2", 0));
        let action = RecordingAction::new("key-1");

        context.refresh(action.as_ref(), false).await;
        let face = context.refresh(action.as_ref(), true).await;

        assert_eq!(provider.calls(), 1);
        assert_eq!(face.title, "72.3°, 55%\n\n\n\n4.3 mph");
    }

    #[tokio::test]
    async fn fetches_again_once_the_clock_passes_the_window() {
        let provider = CountingProvider::returning(sample_reading());
        let clock = ManualClock::at(0);
        let context = context_at(provider.clone(), Configuration::new("KEY", "1,2", 0), clock.clone());
        let action = RecordingAction::new("key-1");

        context.refresh(action.as_ref(), false).await;
        clock.advance(1_000);
        context.refresh(action.as_ref(), true).await;
        assert_eq!(provider.calls(), 1);

        clock.advance(1);
        context.refresh(action.as_ref(), true).await;
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn empty_cache_bypasses_the_throttle() {
        let provider = CountingProvider::failing("offline");
        let context = context_with(provider.clone(), Configuration::new("KEY", "1,2", 0));
        let action = RecordingAction::new("key-1");

        context.refresh(action.as_ref(), false).await;
        context.refresh(action.as_ref(), false).await;

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn upstream_failure_keeps_last_known_icon() {
        let provider = CountingProvider::returning(sample_reading());
        let clock = ManualClock::at(0);
        let context = context_at(provider.clone(), Configuration::new("KEY", "1,2", 0), clock.clone());
        let action = RecordingAction::new("key-1");

        context.refresh(action.as_ref(), false).await;

        provider.fail_from_now("timeout");
        clock.advance(1_100);
        let face = context.refresh(action.as_ref(), true).await;

        assert_eq!(provider.calls(), 2);
        assert_eq!(face.title, "\n\n\n\nError!");
        assert_eq!(face.image, "imgs/actions/weather/04d");
    }

    #[tokio::test]
    async fn upstream_failure_without_history_shows_unknown() {
        let provider = CountingProvider::failing("offline");
        let context = context_with(provider, Configuration::new("KEY", "1,2", 0));
        let action = RecordingAction::new("key-1");

        let face = context.refresh(action.as_ref(), false).await;

        assert_eq!(face, KeyFace::error(render::unknown_image(), "Error!"));
    }
}
