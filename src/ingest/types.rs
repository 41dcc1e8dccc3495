// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A candidate headline as delivered by a source. Fields are raw (unsanitized)
/// and may be missing; validation happens in the job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl Article {
    pub fn new(title: &str, description: &str, url: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            url: Some(url.to_string()),
        }
    }

    /// Lenient conversion from one entry of an API `articles` array.
    /// Scalars are stringified; null, arrays and objects count as missing.
    pub fn from_json(v: &Value) -> Self {
        Self {
            title: scalar_field(v, "title"),
            description: scalar_field(v, "description"),
            url: scalar_field(v, "url"),
        }
    }
}

fn scalar_field(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// `Err` means the source could not be reached; `Ok(vec![])` means it had
    /// nothing usable.
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
}
