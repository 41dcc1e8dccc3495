// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod http;
pub mod ingest;
pub mod job;
pub mod lifecycle;
pub mod metrics;
pub mod scheduler;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::config::AppConfig;
pub use crate::job::{ArticleOrigin, NewsIngestionJob, RunReport};
pub use crate::lifecycle::{activate, deactivate, ActivationCfg};
