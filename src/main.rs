//! auto-tech-news — binary entrypoint.
//! Opens the content store, activates the hourly ingestion job and serves the
//! status/metrics surface until Ctrl-C, then deactivates the job.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use auto_tech_news::{
    api::{self, AppState},
    config::AppConfig,
    http::ReqwestHttp,
    lifecycle::{self, ActivationCfg},
    metrics::Metrics,
    scheduler::{Scheduler, TokioScheduler},
    store::JsonFileStore,
    NewsIngestionJob,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("auto_tech_news=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load()?;
    tracing::info!(
        live_source = cfg.has_api_key(),
        data_path = %cfg.data_path.display(),
        recurrence = ?cfg.recurrence,
        "config loaded"
    );

    let store = Arc::new(
        JsonFileStore::open(&cfg.data_path)
            .await
            .with_context(|| format!("opening content store {}", cfg.data_path.display()))?,
    );
    let job = Arc::new(NewsIngestionJob::from_config(
        &cfg,
        Arc::new(ReqwestHttp::new()),
        store.clone(),
        store,
    ));

    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::new());
    let activation = ActivationCfg {
        first_run_delay_secs: cfg.first_run_delay_secs,
        recurrence: cfg.recurrence,
    };
    // recorder first, so the first scheduled run is already counted
    let metrics = Metrics::init(cfg.recurrence.period().as_secs())?;
    lifecycle::activate(scheduler.as_ref(), job.clone(), activation, chrono::Utc::now())?;

    let router = api::create_router(AppState {
        job,
        scheduler: scheduler.clone(),
    })
    .merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    lifecycle::deactivate(scheduler.as_ref());
    Ok(())
}
