//! Repeating tokio tasks addressed by [`TimerId`].
//!
//! The registry outlives any single scheduler, so a handle persisted on a
//! button can be resolved again after the scheduler is rebuilt.

use parking_lot::Mutex;
use std::{
    collections::HashMap,
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::info;

use crate::host::TimerId;

#[derive(Debug)]
struct TimerEntry {
    owner: String,
    period: Duration,
    task: JoinHandle<()>,
}

#[derive(Debug)]
pub struct TimerRegistry {
    next_id: AtomicU64,
    timers: Mutex<HashMap<TimerId, TimerEntry>>,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            timers: Mutex::new(HashMap::new()),
        }
    }
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `tick` every `period`, first run one period from now.
    ///
    /// Any timer already owned by `owner` is cancelled first, so an owner
    /// never has more than one live timer. Must be called inside a tokio runtime.
    pub fn start<F, Fut>(&self, owner: &str, period: Duration, tick: F) -> TimerId
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the caller already refreshed.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                tick().await;
            }
        });

        let mut timers = self.timers.lock();
        timers.retain(|stale_id, entry| {
            if entry.owner == owner {
                info!(timer = %stale_id, owner, "Replacing interval");
                entry.task.abort();
                false
            } else {
                true
            }
        });
        timers.insert(
            id,
            TimerEntry {
                owner: owner.to_string(),
                period,
                task,
            },
        );

        info!(timer = %id, owner, period_ms = period.as_millis() as u64, "Interval created");
        id
    }

    /// Returns whether a live timer was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        match self.timers.lock().remove(&id) {
            Some(entry) => {
                info!(timer = %id, owner = %entry.owner, "Clearing interval");
                entry.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn period_of(&self, id: TimerId) -> Option<Duration> {
        self.timers.lock().get(&id).map(|entry| entry.period)
    }

    pub fn owned_by(&self, owner: &str) -> Option<TimerId> {
        self.timers
            .lock()
            .iter()
            .find(|(_, entry)| entry.owner == owner)
            .map(|(id, _)| *id)
    }

    pub fn live_count(&self) -> usize {
        self.timers.lock().len()
    }

    pub fn cancel_all(&self) {
        for (id, entry) in self.timers.lock().drain() {
            info!(timer = %id, owner = %entry.owner, "Clearing interval");
            entry.task.abort();
        }
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        for entry in self.timers.get_mut().values() {
            entry.task.abort();
        }
    }
}
