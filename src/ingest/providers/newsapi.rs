// src/ingest/providers/newsapi.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::http::HttpClient;
use crate::ingest::types::{Article, ArticleSource};

/// Live source: NewsAPI `top-headlines`.
pub struct NewsApiProvider {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    api_key: String,
    category: String,
    language: String,
    page_size: u32,
    timeout: Duration,
}

impl NewsApiProvider {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        let defaults = AppConfig::default();
        Self {
            http,
            endpoint: defaults.endpoint,
            api_key: api_key.into(),
            category: defaults.news_category,
            language: defaults.language,
            page_size: defaults.page_size,
            timeout: Duration::from_secs(defaults.timeout_secs),
        }
    }

    /// Build from config; `None` when no usable credential is configured.
    pub fn from_config(http: Arc<dyn HttpClient>, cfg: &AppConfig) -> Option<Self> {
        let key = cfg.api_key()?;
        Some(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key: key.to_string(),
            category: cfg.news_category.clone(),
            language: cfg.language.clone(),
            page_size: cfg.page_size,
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("category", self.category.clone()),
            ("language", self.language.clone()),
            ("pageSize", self.page_size.to_string()),
            ("apiKey", self.api_key.clone()),
        ]
    }
}

/// Extract the `articles` list from a response body. Anything other than an
/// object with a non-empty `articles` array yields nothing.
pub fn parse_articles(body: &str) -> Vec<Article> {
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };
    match v.get("articles") {
        Some(Value::Array(items)) => items.iter().map(Article::from_json).collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl ArticleSource for NewsApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();
        let rsp = self
            .http
            .get(&self.endpoint, &self.query(), self.timeout)
            .await?;
        histogram!("autopost_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        if rsp.status != 200 {
            return Err(anyhow!("API request failed with status: {}", rsp.status));
        }

        let out = parse_articles(&rsp.body);
        counter!("autopost_articles_fetched_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
