// src/api.rs
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::CRON_HOOK;
use crate::job::{NewsIngestionJob, RunReport};
use crate::scheduler::Scheduler;

#[derive(Clone)]
pub struct AppState {
    pub job: Arc<NewsIngestionJob>,
    pub scheduler: Arc<dyn Scheduler>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/status", get(status))
        .route("/admin/run", post(admin_run))
        .with_state(state)
}

#[derive(serde::Serialize)]
struct StatusOut {
    hook: &'static str,
    scheduled: bool,
    next_run: Option<DateTime<Utc>>,
    live_source: bool,
    last_run: Option<RunReport>,
}

async fn status(State(state): State<AppState>) -> Json<StatusOut> {
    let next_run = state.scheduler.next_scheduled(CRON_HOOK);
    Json(StatusOut {
        hook: CRON_HOOK,
        scheduled: next_run.is_some(),
        next_run,
        live_source: state.job.has_live_source(),
        last_run: state.job.last_report(),
    })
}

/// Run the job once, now, outside the schedule.
async fn admin_run(State(state): State<AppState>) -> Json<RunReport> {
    tracing::info!("manual run requested");
    Json(state.job.run().await)
}
