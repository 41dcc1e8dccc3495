// src/config/mod.rs
//! Process-wide constants and the runtime configuration loader.

pub mod app;

pub use app::{AppConfig, ENV_API_KEY, ENV_BIND_ADDR, ENV_CONFIG_PATH, ENV_DATA_PATH};

/// Scheduler hook the ingestion job is registered under.
pub const CRON_HOOK: &str = "auto_tech_news_hourly_event";

/// Category every published item is filed under.
pub const CATEGORY_NAME: &str = "Technology News";

/// Meta key holding the article's original URL.
pub const SOURCE_URL_META_KEY: &str = "_tech_news_source_url";

/// NewsAPI top-headlines endpoint.
pub const NEWSAPI_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";

/// Delay between activation and the first scheduled run.
pub const FIRST_RUN_DELAY_SECS: u64 = 300;

pub const DEFAULT_CONFIG_PATH: &str = "config/autopost.toml";
