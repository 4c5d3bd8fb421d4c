//! Per-button refresh timers driven by host lifecycle callbacks.
//!
//! Callbacks arrive unordered and often redundantly (appear, key press,
//! settings notifications). Each one reconciles the button's timer against the
//! cached settings and then renders once, so repeating a callback is harmless.

use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::{
    host::{ActionSettings, KeyAction, SettingsSource},
    model::Configuration,
    refresh::PluginContext,
    render::KeyFace,
    timer::TimerRegistry,
};

/// Refresh settings outside `[REFRESH_MIN_MINUTES, REFRESH_MAX_MINUTES]` disable the timer.
pub const REFRESH_MIN_MINUTES: u32 = 3;
pub const REFRESH_MAX_MINUTES: u32 = 60;
pub const MS_PER_MINUTE: u64 = 60_000;

/// Bounds applied to the period of a started timer.
pub const INTERVAL_FLOOR_MS: u64 = 300_000;
pub const INTERVAL_CEILING_MS: u64 = 36_000_000;

pub type SharedAction = Arc<dyn KeyAction>;

/// Milliseconds between refreshes for a user setting, or 0 when disabled.
pub fn refresh_time_ms(refresh_minutes: u32) -> u64 {
    if (REFRESH_MIN_MINUTES..=REFRESH_MAX_MINUTES).contains(&refresh_minutes) {
        u64::from(refresh_minutes.clamp(REFRESH_MIN_MINUTES, REFRESH_MAX_MINUTES)) * MS_PER_MINUTE
    } else {
        0
    }
}

/// Period a timer is actually started with, if any.
pub fn scheduled_period(refresh_minutes: u32) -> Option<Duration> {
    match refresh_time_ms(refresh_minutes) {
        0 => None,
        ms => Some(Duration::from_millis(
            ms.clamp(INTERVAL_FLOOR_MS, INTERVAL_CEILING_MS),
        )),
    }
}

/// Host callback that led to a reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    WillAppear,
    KeyDown,
    SettingsChanged,
}

impl Trigger {
    /// Whether an existing timer must be torn down even if it still matches.
    fn resets(self) -> bool {
        matches!(self, Trigger::SettingsChanged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Active { interval_ms: u64 },
}

pub struct RefreshScheduler {
    context: Arc<PluginContext>,
    timers: Arc<TimerRegistry>,
    source: Arc<dyn SettingsSource>,
}

impl fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("context", &self.context)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

impl RefreshScheduler {
    pub fn new(
        context: Arc<PluginContext>,
        timers: Arc<TimerRegistry>,
        source: Arc<dyn SettingsSource>,
    ) -> Self {
        Self {
            context,
            timers,
            source,
        }
    }

    pub fn context(&self) -> &Arc<PluginContext> {
        &self.context
    }

    /// The button became visible.
    pub async fn on_will_appear(&self, action: &SharedAction) -> KeyFace {
        self.sync_global_settings().await;
        self.begin(action, Trigger::WillAppear).await
    }

    /// The button was pressed; also forces a render.
    pub async fn on_key_down(&self, action: &SharedAction) -> KeyFace {
        self.sync_global_settings().await;
        self.begin(action, Trigger::KeyDown).await
    }

    /// Global settings were (re)delivered by the host.
    ///
    /// Only an actual change restarts the timers of `actions`; returns whether
    /// the settings changed.
    pub async fn on_did_receive_global_settings(
        &self,
        settings: Configuration,
        actions: &[SharedAction],
    ) -> bool {
        info!(
            refresh_minutes = settings.refresh_minutes,
            "Detected global settings event"
        );

        let changed = self.context.settings.update(settings);
        if changed {
            info!(buttons = actions.len(), "Detected settings change, triggering interval");
            for action in actions {
                self.begin(action, Trigger::SettingsChanged).await;
            }
        }

        changed
    }

    /// Cancel the button's timer and forget its handle.
    pub async fn stop(&self, action: &SharedAction) {
        let persisted = self.persisted(action.as_ref()).await;
        for id in persisted
            .interval_id
            .into_iter()
            .chain(self.timers.owned_by(action.id()))
        {
            self.timers.cancel(id);
        }
        if persisted.interval_id.is_some() {
            self.persist(action.as_ref(), ActionSettings::default()).await;
        }
    }

    /// Abort every running timer.
    pub fn shutdown(&self) {
        self.timers.cancel_all();
    }

    pub fn state(&self, action_id: &str) -> TimerState {
        self.timers
            .owned_by(action_id)
            .and_then(|id| self.timers.period_of(id))
            .map_or(TimerState::Idle, |period| TimerState::Active {
                interval_ms: period.as_millis() as u64,
            })
    }

    async fn sync_global_settings(&self) {
        match self.source.global_settings().await {
            Ok(settings) => {
                self.context.settings.update(settings);
            }
            Err(e) => warn!(error = %e, "Failed to read global settings, keeping cached values"),
        }
    }

    async fn begin(&self, action: &SharedAction, trigger: Trigger) -> KeyFace {
        let config = self.context.settings.read();
        let desired = scheduled_period(config.refresh_minutes);
        let persisted = self.persisted(action.as_ref()).await.interval_id;

        // A persisted handle only counts if this process still runs it; one
        // left over from an earlier process is dropped.
        let live = persisted
            .filter(|id| self.timers.period_of(*id).is_some())
            .or_else(|| self.timers.owned_by(action.id()));

        let keep = match (live, desired) {
            (Some(id), Some(period)) if !trigger.resets() => {
                self.timers.period_of(id) == Some(period)
            }
            _ => false,
        };

        if keep {
            if persisted != live {
                self.persist(action.as_ref(), ActionSettings { interval_id: live })
                    .await;
            }
        } else {
            if let Some(id) = live {
                self.timers.cancel(id);
            }
            if persisted.is_some() {
                self.persist(action.as_ref(), ActionSettings::default()).await;
            }

            if let Some(period) = desired {
                info!(action = action.id(), ?trigger, period_ms = period.as_millis() as u64, "Creating interval");
                let context = Arc::clone(&self.context);
                let ticking = Arc::clone(action);
                let id = self.timers.start(action.id(), period, move || {
                    let context = Arc::clone(&context);
                    let action = Arc::clone(&ticking);
                    async move {
                        context.refresh(action.as_ref(), true).await;
                    }
                });
                self.persist(action.as_ref(), ActionSettings { interval_id: Some(id) })
                    .await;
            }
        }

        // Always render now; the timer only covers later refreshes.
        self.context.refresh(action.as_ref(), false).await
    }

    async fn persisted(&self, action: &dyn KeyAction) -> ActionSettings {
        action.settings().await.unwrap_or_else(|e| {
            warn!(action = action.id(), error = %e, "Failed to read button settings");
            ActionSettings::default()
        })
    }

    async fn persist(&self, action: &dyn KeyAction, settings: ActionSettings) {
        if let Err(e) = action.set_settings(settings).await {
            warn!(action = action.id(), error = %e, "Failed to persist button settings");
        }
    }
}
