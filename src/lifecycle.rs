// src/lifecycle.rs
//! Register on start, unregister on stop.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;

use crate::config::{CRON_HOOK, FIRST_RUN_DELAY_SECS};
use crate::scheduler::{Recurrence, ScheduledJob, Scheduler};

#[derive(Debug, Clone, Copy)]
pub struct ActivationCfg {
    pub first_run_delay_secs: u64,
    pub recurrence: Recurrence,
}

impl Default for ActivationCfg {
    fn default() -> Self {
        Self {
            first_run_delay_secs: FIRST_RUN_DELAY_SECS,
            recurrence: Recurrence::Hourly,
        }
    }
}

/// Schedule the job under [`CRON_HOOK`] unless something already is.
/// Returns whether a new event was registered.
pub fn activate(
    scheduler: &dyn Scheduler,
    job: Arc<dyn ScheduledJob>,
    cfg: ActivationCfg,
    now: DateTime<Utc>,
) -> Result<bool> {
    if scheduler.next_scheduled(CRON_HOOK).is_some() {
        return Ok(false);
    }
    let first_run = i64::try_from(cfg.first_run_delay_secs)
        .ok()
        .and_then(ChronoDuration::try_seconds)
        .and_then(|delay| now.checked_add_signed(delay))
        .ok_or_else(|| {
            anyhow!(
                "first run delay of {}s is out of range",
                cfg.first_run_delay_secs
            )
        })?;
    scheduler.schedule_event(CRON_HOOK, first_run, cfg.recurrence, job)?;
    Ok(true)
}

/// Remove the scheduled event, if any. Returns whether one was removed.
pub fn deactivate(scheduler: &dyn Scheduler) -> bool {
    if scheduler.next_scheduled(CRON_HOOK).is_none() {
        return false;
    }
    scheduler.unschedule_event(CRON_HOOK)
}
