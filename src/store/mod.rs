// src/store/mod.rs
//! Content storage and taxonomy seams plus the bundled backends.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

pub type ItemId = u64;
pub type CategoryId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Trash,
}

/// Fields supplied when creating a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub body: String,
    pub status: PostStatus,
    pub kind: String,
}

impl NewItem {
    /// A published `post`.
    pub fn published_post(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            status: PostStatus::Publish,
            kind: "post".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub title: String,
    pub body: String,
    pub status: PostStatus,
    pub kind: String,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_item(&self, item: NewItem) -> StoreResult<ItemId>;

    /// Ids of published items whose meta `key` equals `value`, at most `limit`.
    async fn find_ids_by_meta(
        &self,
        key: &str,
        value: &str,
        limit: usize,
    ) -> StoreResult<Vec<ItemId>>;

    /// The first published item with exactly this title.
    async fn find_by_title(&self, title: &str) -> StoreResult<Option<ContentItem>>;

    async fn set_meta(&self, id: ItemId, key: &str, value: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait Taxonomy: Send + Sync {
    async fn category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;

    async fn create_category(&self, name: &str) -> StoreResult<Category>;

    /// Replace the item's category list.
    async fn set_item_categories(&self, id: ItemId, categories: &[CategoryId]) -> StoreResult<()>;
}

/// Plain serializable state shared by the memory and file backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    next_item_id: ItemId,
    #[serde(default)]
    next_category_id: CategoryId,
    #[serde(default)]
    items: Vec<ContentItem>,
    #[serde(default)]
    categories: Vec<Category>,
}

impl StoreState {
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn insert_item(&mut self, item: NewItem) -> StoreResult<ItemId> {
        if item.title.trim().is_empty() && item.body.trim().is_empty() {
            return Err(StoreError::Invalid(
                "content, title, and excerpt are empty".into(),
            ));
        }
        self.next_item_id += 1;
        let id = self.next_item_id;
        self.items.push(ContentItem {
            id,
            title: item.title,
            body: item.body,
            status: item.status,
            kind: item.kind,
            categories: Vec::new(),
            meta: BTreeMap::new(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn find_ids_by_meta(&self, key: &str, value: &str, limit: usize) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|it| it.status == PostStatus::Publish)
            .filter(|it| it.meta.get(key).map(String::as_str) == Some(value))
            .map(|it| it.id)
            .take(limit)
            .collect()
    }

    fn find_by_title(&self, title: &str) -> Option<ContentItem> {
        self.items
            .iter()
            .find(|it| it.status == PostStatus::Publish && it.title == title)
            .cloned()
    }

    fn item_mut(&mut self, id: ItemId) -> StoreResult<&mut ContentItem> {
        self.items
            .iter_mut()
            .find(|it| it.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))
    }

    fn set_meta(&mut self, id: ItemId, key: &str, value: &str) -> StoreResult<()> {
        self.item_mut(id)?
            .meta
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn category_by_name(&self, name: &str) -> Option<Category> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|c| c.name.trim() == name)
            .cloned()
    }

    fn create_category(&mut self, name: &str) -> StoreResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid("category name is empty".into()));
        }
        if self.category_by_name(name).is_some() {
            return Err(StoreError::Conflict(format!("category `{name}`")));
        }
        self.next_category_id += 1;
        let cat = Category {
            id: self.next_category_id,
            name: name.to_string(),
        };
        self.categories.push(cat.clone());
        Ok(cat)
    }

    fn set_item_categories(&mut self, id: ItemId, categories: &[CategoryId]) -> StoreResult<()> {
        if let Some(missing) = categories
            .iter()
            .find(|c| !self.categories.iter().any(|k| k.id == **c))
        {
            return Err(StoreError::NotFound(format!("category {missing}")));
        }
        self.item_mut(id)?.categories = categories.to_vec();
        Ok(())
    }
}
