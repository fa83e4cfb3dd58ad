use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::repository::CollectionRepository;
use super::{Collection, CollectionDraft};
use crate::records;

/// Mirrors `FilePromptRepository`: JSON files under `<base_dir>/collections/`.
pub struct FileCollectionRepository {
    dir: PathBuf,
    collections: RwLock<IndexMap<String, Collection>>,
}

impl FileCollectionRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: base_dir.as_ref().join("collections"),
            collections: RwLock::new(IndexMap::new()),
        }
    }
}

#[async_trait]
impl CollectionRepository for FileCollectionRepository {
    async fn list(&self) -> Vec<Collection> {
        self.collections.read().await.values().cloned().collect()
    }

    async fn get(&self, id: &str) -> Option<Collection> {
        self.collections.read().await.get(id).cloned()
    }

    async fn create(&self, draft: CollectionDraft) -> Result<Collection> {
        let collection = Collection::from_draft(draft);
        records::write_record(&self.dir, &collection.id, &collection)?;
        self.collections
            .write()
            .await
            .insert(collection.id.clone(), collection.clone());
        Ok(collection)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        records::remove_record(&self.dir, id)?;
        Ok(collections.shift_remove(id).is_some())
    }

    async fn load_all(&self) -> Result<()> {
        let mut loaded: Vec<Collection> = records::read_records(&self.dir)?;
        loaded.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        tracing::info!(count = loaded.len(), "loaded collections");
        *self.collections.write().await = loaded
            .into_iter()
            .map(|collection| (collection.id.clone(), collection))
            .collect();
        Ok(())
    }
}
