// src/store/file.rs
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::{
    Category, CategoryId, ContentItem, ContentStore, ItemId, NewItem, StoreResult, StoreState,
    Taxonomy,
};

/// Store persisted as a single pretty-printed JSON document.
/// Every mutation rewrites the file via temp file + rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonFileStore {
    /// Open `path`; a missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "content store opened");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn items(&self) -> Vec<ContentItem> {
        self.state.read().await.items().to_vec()
    }

    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Apply `f` to a copy of the state and commit only if it succeeds and the
    /// file write goes through.
    async fn mutate<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreState) -> StoreResult<T>,
    {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl ContentStore for JsonFileStore {
    async fn insert_item(&self, item: NewItem) -> StoreResult<ItemId> {
        self.mutate(|s| s.insert_item(item)).await
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
        self.mutate(|s| s.set_meta(id, key, value)).await
    }
}

#[async_trait]
impl Taxonomy for JsonFileStore {
    async fn category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self.state.read().await.category_by_name(name))
    }

    async fn create_category(&self, name: &str) -> StoreResult<Category> {
        self.mutate(|s| s.create_category(name)).await
    }

    async fn set_item_categories(&self, id: ItemId, categories: &[CategoryId]) -> StoreResult<()> {
        self.mutate(|s| s.set_item_categories(id, categories)).await
    }
}
