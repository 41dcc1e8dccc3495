// src/store/memory.rs
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Category, CategoryId, ContentItem, ContentStore, ItemId, NewItem, StoreResult, StoreState,
    Taxonomy,
};

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn items(&self) -> Vec<ContentItem> {
        self.state.read().await.items().to_vec()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories().to_vec()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_item(&self, item: NewItem) -> StoreResult<ItemId> {
        self.state.write().await.insert_item(item)
    }

    async fn find_ids_by_meta(
        &self,
        key: &str,
        value: &str,
        limit: usize,
    ) -> StoreResult<Vec<ItemId>> {
        Ok(self.state.read().await.find_ids_by_meta(key, value, limit))
    }

    async fn find_by_title(&self, title: &str) -> StoreResult<Option<ContentItem>> {
        Ok(self.state.read().await.find_by_title(title))
    }

    async fn set_meta(&self, id: ItemId, key: &str, value: &str) -> StoreResult<()> {
        self.state.write().await.set_meta(id, key, value)
    }
}

#[async_trait]
impl Taxonomy for MemoryStore {
    async fn category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self.state.read().await.category_by_name(name))
    }

    async fn create_category(&self, name: &str) -> StoreResult<Category> {
        self.state.write().await.create_category(name)
    }

    async fn set_item_categories(&self, id: ItemId, categories: &[CategoryId]) -> StoreResult<()> {
        self.state.write().await.set_item_categories(id, categories)
    }
}
