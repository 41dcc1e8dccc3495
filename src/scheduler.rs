// src/scheduler.rs
//! Named recurring events, in the style of a CMS cron: register a hook with
//! a first-run time and a recurrence, look it up, unregister it.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    Hourly,
    TwiceDaily,
    Daily,
}

impl Recurrence {
    pub fn period(self) -> Duration {
        match self {
            Recurrence::Hourly => Duration::from_secs(3_600),
            Recurrence::TwiceDaily => Duration::from_secs(43_200),
            Recurrence::Daily => Duration::from_secs(86_400),
        }
    }
}

/// Work bound to a hook.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    async fn run_scheduled(&self);
}

pub trait Scheduler: Send + Sync {
    /// Next fire time of `hook`, or `None` if it is not scheduled.
    fn next_scheduled(&self, hook: &str) -> Option<DateTime<Utc>>;

    /// Register `job` under `hook`. Fails if the hook is already scheduled.
    fn schedule_event(
        &self,
        hook: &str,
        first_run: DateTime<Utc>,
        recurrence: Recurrence,
        job: Arc<dyn ScheduledJob>,
    ) -> Result<()>;

    /// Remove `hook`. Returns whether anything was scheduled.
    fn unschedule_event(&self, hook: &str) -> bool;
}

struct Event {
    first_run: DateTime<Utc>,
    recurrence: Recurrence,
    handle: JoinHandle<()>,
}

/// One tokio task per hook. A hook's runs never overlap: the task awaits each
/// run before waiting for the next tick, and ticks missed meanwhile are skipped.
#[derive(Default)]
pub struct TokioScheduler {
    events: Mutex<HashMap<String, Event>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hooks(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|ev| ev.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// First fire time at or after `now` for a series starting at `first_run`.
pub fn next_fire_time(
    first_run: DateTime<Utc>,
    recurrence: Recurrence,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if now <= first_run {
        return first_run;
    }
    let period = recurrence.period().as_secs() as i64;
    let elapsed = (now - first_run).num_seconds();
    let n = (elapsed + period - 1) / period;
    first_run + ChronoDuration::seconds(n * period)
}

impl Scheduler for TokioScheduler {
    fn next_scheduled(&self, hook: &str) -> Option<DateTime<Utc>> {
        let events = self.events.lock().ok()?;
        let ev = events.get(hook)?;
        Some(next_fire_time(ev.first_run, ev.recurrence, Utc::now()))
    }

    fn schedule_event(
        &self,
        hook: &str,
        first_run: DateTime<Utc>,
        recurrence: Recurrence,
        job: Arc<dyn ScheduledJob>,
    ) -> Result<()> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| anyhow!("scheduler mutex poisoned"))?;
        if events.contains_key(hook) {
            return Err(anyhow!("hook `{hook}` is already scheduled"));
        }

        let delay = (first_run - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let name = hook.to_string();
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + delay;
            let mut ticker = tokio::time::interval_at(start, recurrence.period());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                counter!("scheduler_fired_total", "hook" => name.clone()).increment(1);
                tracing::debug!(hook = %name, "scheduled event fired");
                job.run_scheduled().await;
            }
        });

        tracing::info!(hook, first_run = %first_run, ?recurrence, "event scheduled");
        events.insert(
            hook.to_string(),
            Event {
                first_run,
                recurrence,
                handle,
            },
        );
        Ok(())
    }

    fn unschedule_event(&self, hook: &str) -> bool {
        let Ok(mut events) = self.events.lock() else {
            return false;
        };
        match events.remove(hook) {
            Some(ev) => {
                ev.handle.abort();
                tracing::info!(hook, "event unscheduled");
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if let Ok(events) = self.events.get_mut() {
            for ev in events.values() {
                ev.handle.abort();
            }
        }
    }
}
