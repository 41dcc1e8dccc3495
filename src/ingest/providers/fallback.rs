// src/ingest/providers/fallback.rs
use anyhow::Result;
use async_trait::async_trait;

use crate::ingest::types::{Article, ArticleSource};

const FALLBACK: [(&str, &str); 5] = [
    (
        "AI assistants expand enterprise adoption",
        "Organizations continue pilots across support, HR, and analytics with a focus on privacy and governance.",
    ),
    (
        "Cloud providers roll out cost visibility updates",
        "New tooling emphasizes spend transparency and workload optimization for large-scale deployments.",
    ),
    (
        "Cybersecurity teams prioritize identity protection",
        "Security leaders increase investment in MFA, access monitoring, and zero-trust enforcement.",
    ),
    (
        "Chipmakers announce next-gen efficiency targets",
        "Upcoming processors focus on power efficiency and specialized AI acceleration.",
    ),
    (
        "Data center capacity expands in key regions",
        "Operators accelerate new builds to meet AI demand and regional compute needs.",
    ),
];

/// The hand-written articles used when no live source is configured or the
/// live source comes back empty. None of them carries a URL.
pub fn fallback_articles() -> Vec<Article> {
    FALLBACK
        .iter()
        .map(|(title, description)| Article::new(title, description, ""))
        .collect()
}

pub struct FallbackProvider;

#[async_trait]
impl ArticleSource for FallbackProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Ok(fallback_articles())
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
