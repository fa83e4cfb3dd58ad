use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::repository::PromptRepository;
use super::{Prompt, PromptDraft, PromptPatch};
use crate::records;

/// File-based prompt store: an insertion-ordered in-memory index backed by
/// one JSON file per prompt under `<base_dir>/prompts/`. Every write hits
/// disk before the index is updated.
pub struct FilePromptRepository {
    dir: PathBuf,
    prompts: RwLock<IndexMap<String, Prompt>>,
}

impl FilePromptRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: base_dir.as_ref().join("prompts"),
            prompts: RwLock::new(IndexMap::new()),
        }
    }
}

#[async_trait]
impl PromptRepository for FilePromptRepository {
    async fn list(&self) -> Vec<Prompt> {
        self.prompts.read().await.values().cloned().collect()
    }

    async fn get(&self, id: &str) -> Option<Prompt> {
        self.prompts.read().await.get(id).cloned()
    }

    async fn create(&self, draft: PromptDraft) -> Result<Prompt> {
        let prompt = Prompt::from_draft(draft);
        records::write_record(&self.dir, &prompt.id, &prompt)?;
        self.prompts
            .write()
            .await
            .insert(prompt.id.clone(), prompt.clone());
        tracing::debug!(prompt_id = %prompt.id, "created prompt");
        Ok(prompt)
    }

    async fn update(&self, id: &str, patch: PromptPatch) -> Result<Option<Prompt>> {
        let mut prompts = self.prompts.write().await;
        let Some(existing) = prompts.get(id) else {
            return Ok(None);
        };

        let mut updated = existing.clone();
        patch.apply(&mut updated);
        records::write_record(&self.dir, id, &updated)?;
        prompts.insert(id.to_string(), updated.clone());
        Ok(Some(updated))
    }

    async fn save(&self, prompt: Prompt) -> Result<()> {
        records::write_record(&self.dir, &prompt.id, &prompt)?;
        self.prompts.write().await.insert(prompt.id.clone(), prompt);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut prompts = self.prompts.write().await;
        records::remove_record(&self.dir, id)?;
        Ok(prompts.shift_remove(id).is_some())
    }

    async fn load_all(&self) -> Result<()> {
        let mut loaded: Vec<Prompt> = records::read_records(&self.dir)?;
        loaded.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let count = loaded.len();
        *self.prompts.write().await = loaded
            .into_iter()
            .map(|prompt| (prompt.id.clone(), prompt))
            .collect();

        if count > 0 {
            tracing::info!(count, "Loaded saved prompts");
        }
        Ok(())
    }
}
