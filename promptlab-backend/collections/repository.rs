use anyhow::Result;
use async_trait::async_trait;

use super::{Collection, CollectionDraft};

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn list(&self) -> Vec<Collection>;
    async fn get(&self, id: &str) -> Option<Collection>;
    async fn create(&self, draft: CollectionDraft) -> Result<Collection>;
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn load_all(&self) -> Result<()>;
}
