use anyhow::Result;
use async_trait::async_trait;

use super::{Prompt, PromptDraft, PromptPatch};

#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// All prompts in insertion order.
    async fn list(&self) -> Vec<Prompt>;
    async fn get(&self, id: &str) -> Option<Prompt>;
    async fn create(&self, draft: PromptDraft) -> Result<Prompt>;
    /// Merge `patch` into the stored prompt. `Ok(None)` when `id` is unknown.
    async fn update(&self, id: &str, patch: PromptPatch) -> Result<Option<Prompt>>;
    async fn save(&self, prompt: Prompt) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn load_all(&self) -> Result<()>;
}
