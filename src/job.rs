// src/job.rs
//! The ingestion pass: pick a source, then sanitize, validate, dedupe and
//! publish each article in order. Every external call is individually
//! fault-tolerant; a run never fails as a whole.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, CATEGORY_NAME, SOURCE_URL_META_KEY};
use crate::http::HttpClient;
use crate::ingest::providers::{fallback::FallbackProvider, newsapi::NewsApiProvider};
use crate::ingest::types::{Article, ArticleSource};
use crate::ingest::{sanitize_text_field, sanitize_url};
use crate::scheduler::ScheduledJob;
use crate::store::{CategoryId, ContentStore, ItemId, NewItem, StoreResult, Taxonomy};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_metrics);
}

/// Every series the crate emits, including the provider and scheduler ones.
fn describe_metrics() {
    describe_counter!("autopost_runs_total", "Ingestion runs started.");
    describe_counter!(
        "autopost_items_created_total",
        "Content items published by the job."
    );
    describe_counter!(
        "autopost_skipped_invalid_total",
        "Articles dropped for an empty title or description."
    );
    describe_counter!(
        "autopost_skipped_duplicate_total",
        "Articles dropped because they were already published."
    );
    describe_counter!(
        "autopost_insert_errors_total",
        "Content item creation failures."
    );
    describe_counter!(
        "autopost_fetch_errors_total",
        "Live fetch transport or status errors."
    );
    describe_counter!(
        "autopost_fallback_runs_total",
        "Runs that used the fallback article set."
    );
    describe_counter!(
        "autopost_articles_fetched_total",
        "Articles returned by the live source."
    );
    describe_counter!(
        "scheduler_fired_total",
        "Scheduled event runs, by hook."
    );
    describe_histogram!("autopost_fetch_ms", "Live fetch time in milliseconds.");
    describe_gauge!("autopost_last_run_ts", "Unix ts when the job last ran.");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleOrigin {
    Live,
    Fallback,
    /// Nothing to process.
    None,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub origin: ArticleOrigin,
    pub candidates: usize,
    pub created: Vec<ItemId>,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
    pub category: Option<CategoryId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

enum Outcome {
    Created(ItemId),
    Invalid,
    Duplicate,
    Failed,
}

pub struct NewsIngestionJob {
    live: Option<Arc<dyn ArticleSource>>,
    fallback: Arc<dyn ArticleSource>,
    content: Arc<dyn ContentStore>,
    taxonomy: Arc<dyn Taxonomy>,
    category_name: String,
    last_report: Mutex<Option<RunReport>>,
}

impl NewsIngestionJob {
    /// A job with no live source: every run uses the fallback articles.
    pub fn new(content: Arc<dyn ContentStore>, taxonomy: Arc<dyn Taxonomy>) -> Self {
        Self {
            live: None,
            fallback: Arc::new(FallbackProvider),
            content,
            taxonomy,
            category_name: CATEGORY_NAME.to_string(),
            last_report: Mutex::new(None),
        }
    }

    /// Wire the live NewsAPI source when the config carries a credential.
    pub fn from_config(
        cfg: &AppConfig,
        http: Arc<dyn HttpClient>,
        content: Arc<dyn ContentStore>,
        taxonomy: Arc<dyn Taxonomy>,
    ) -> Self {
        let mut job = Self::new(content, taxonomy).with_category_name(&cfg.category_name);
        if let Some(p) = NewsApiProvider::from_config(http, cfg) {
            job = job.with_live_source(Arc::new(p));
        }
        job
    }

    pub fn with_live_source(mut self, src: Arc<dyn ArticleSource>) -> Self {
        self.live = Some(src);
        self
    }

    pub fn with_fallback(mut self, src: Arc<dyn ArticleSource>) -> Self {
        self.fallback = src;
        self
    }

    pub fn with_category_name(mut self, name: &str) -> Self {
        let name = name.trim();
        self.category_name = if name.is_empty() {
            CATEGORY_NAME.to_string()
        } else {
            name.to_string()
        };
        self
    }

    pub fn has_live_source(&self) -> bool {
        self.live.is_some()
    }

    pub fn last_report(&self) -> Option<RunReport> {
        self.last_report.lock().ok().and_then(|r| r.clone())
    }

    /// Run one full pass.
    pub async fn run(&self) -> RunReport {
        ensure_metrics_described();
        counter!("autopost_runs_total").increment(1);
        let started_at = Utc::now();

        let (origin, articles) = self.collect_articles().await;
        let mut report = RunReport {
            origin,
            candidates: articles.len(),
            created: Vec::new(),
            skipped_invalid: 0,
            skipped_duplicate: 0,
            failed: 0,
            category: None,
            started_at,
            finished_at: started_at,
        };

        if !articles.is_empty() {
            report.category = self.resolve_category().await;
            for article in &articles {
                match self.publish(article, report.category).await {
                    Outcome::Created(id) => report.created.push(id),
                    Outcome::Invalid => report.skipped_invalid += 1,
                    Outcome::Duplicate => report.skipped_duplicate += 1,
                    Outcome::Failed => report.failed += 1,
                }
            }
        }

        report.finished_at = Utc::now();
        counter!("autopost_items_created_total").increment(report.created.len() as u64);
        counter!("autopost_skipped_invalid_total").increment(report.skipped_invalid as u64);
        counter!("autopost_skipped_duplicate_total").increment(report.skipped_duplicate as u64);
        gauge!("autopost_last_run_ts").set(report.finished_at.timestamp() as f64);

        info!(
            origin = ?report.origin,
            candidates = report.candidates,
            created = report.created.len(),
            invalid = report.skipped_invalid,
            duplicate = report.skipped_duplicate,
            failed = report.failed,
            "ingestion run finished"
        );

        if let Ok(mut last) = self.last_report.lock() {
            *last = Some(report.clone());
        }
        report
    }

    async fn collect_articles(&self) -> (ArticleOrigin, Vec<Article>) {
        if let Some(live) = &self.live {
            match live.fetch_latest().await {
                Ok(v) if !v.is_empty() => return (ArticleOrigin::Live, v),
                Ok(_) => info!(source = live.name(), "live source returned no articles"),
                Err(e) => {
                    error!(error = %e, source = live.name(), "API request error");
                    counter!("autopost_fetch_errors_total").increment(1);
                }
            }
        }

        match self.fallback.fetch_latest().await {
            Ok(v) if !v.is_empty() => {
                counter!("autopost_fallback_runs_total").increment(1);
                (ArticleOrigin::Fallback, v)
            }
            Ok(_) => (ArticleOrigin::None, Vec::new()),
            Err(e) => {
                warn!(error = %e, source = self.fallback.name(), "fallback source error");
                (ArticleOrigin::None, Vec::new())
            }
        }
    }

    /// Look the category up by name, creating it if absent. `None` on failure.
    async fn resolve_category(&self) -> Option<CategoryId> {
        match self.taxonomy.category_by_name(&self.category_name).await {
            Ok(Some(c)) => return Some(c.id),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, category = %self.category_name, "category lookup failed");
            }
        }
        match self.taxonomy.create_category(&self.category_name).await {
            Ok(c) => {
                info!(category = %c.name, id = c.id, "category created");
                Some(c.id)
            }
            Err(e) => {
                error!(error = %e, category = %self.category_name, "Failed to create category");
                None
            }
        }
    }

    async fn publish(&self, article: &Article, category: Option<CategoryId>) -> Outcome {
        let title = sanitize_text_field(article.title.as_deref().unwrap_or_default());
        let summary = sanitize_text_field(article.description.as_deref().unwrap_or_default());
        let url = sanitize_url(article.url.as_deref().unwrap_or_default());

        if title.is_empty() || summary.is_empty() {
            return Outcome::Invalid;
        }

        match self.is_duplicate(&title, &url).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(title = %title, url = %url, "duplicate article skipped");
                return Outcome::Duplicate;
            }
            Err(e) => {
                warn!(error = %e, title = %title, "duplicate check failed; skipping article");
                return Outcome::Duplicate;
            }
        }

        let id = match self
            .content
            .insert_item(NewItem::published_post(title, summary))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Failed to insert post");
                counter!("autopost_insert_errors_total").increment(1);
                return Outcome::Failed;
            }
        };

        if let Some(cat) = category {
            if let Err(e) = self.taxonomy.set_item_categories(id, &[cat]).await {
                warn!(error = %e, item = id, category = cat, "failed to attach category");
            }
        }

        if !url.is_empty() {
            if let Err(e) = self.content.set_meta(id, SOURCE_URL_META_KEY, &url).await {
                warn!(error = %e, item = id, "failed to store source url");
            }
        }

        Outcome::Created(id)
    }

    /// URL match first, then exact title.
    async fn is_duplicate(&self, title: &str, url: &str) -> StoreResult<bool> {
        if !url.is_empty()
            && !self
                .content
                .find_ids_by_meta(SOURCE_URL_META_KEY, url, 1)
                .await?
                .is_empty()
        {
            return Ok(true);
        }
        Ok(self.content.find_by_title(title).await?.is_some())
    }
}

#[async_trait]
impl ScheduledJob for NewsIngestionJob {
    async fn run_scheduled(&self) {
        self.run().await;
    }
}
