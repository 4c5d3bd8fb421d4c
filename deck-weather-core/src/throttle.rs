use chrono::Utc;
use parking_lot::Mutex;
use std::fmt::Debug;
use tracing::info;

/// Minimum gap between permitted upstream fetches.
pub const DEBOUNCE_WINDOW_MS: i64 = 1000;

/// Wall-clock source for the throttle, in epoch milliseconds.
pub trait Clock: Send + Sync + Debug {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Time-window gate in front of the weather provider.
///
/// Every call that returns `true` records its timestamp, so callers must ask
/// exactly once per fetch they intend to make.
#[derive(Debug, Default)]
pub struct FetchThrottle {
    last_permitted: Mutex<Option<i64>>,
}

impl FetchThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permit(&self, now_millis: i64) -> bool {
        let mut last = self.last_permitted.lock();

        let Some(previous) = *last else {
            *last = Some(now_millis);
            return true;
        };

        let elapsed = now_millis - previous;
        if elapsed > DEBOUNCE_WINDOW_MS {
            info!(elapsed, "Debounce window elapsed, permitting fetch");
            *last = Some(now_millis);
            true
        } else {
            info!(elapsed, "Debouncing fetch");
            false
        }
    }
}
