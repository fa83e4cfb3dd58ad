pub mod file_repository;
pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored prompt template.
///
/// `tags` always holds normalized tags (see [`crate::tags::normalize_tag`]) with
/// no duplicates. `collection_id` is a weak reference: the collection may have
/// been deleted since.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prompt {
    pub fn from_draft(draft: PromptDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            content: draft.content,
            description: draft.description,
            collection_id: draft.collection_id,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Validated data for a new prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptDraft {
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub collection_id: Option<String>,
    pub tags: Vec<String>,
}

/// Validated partial update. `None` leaves the field untouched; for the
/// nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PromptPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<Option<String>>,
    pub collection_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl PromptPatch {
    /// A patch that overwrites every user-editable field.
    pub fn replace_with(draft: PromptDraft) -> Self {
        Self {
            title: Some(draft.title),
            content: Some(draft.content),
            description: Some(draft.description),
            collection_id: Some(draft.collection_id),
            tags: Some(draft.tags),
        }
    }

    pub fn clear_collection() -> Self {
        Self {
            collection_id: Some(None),
            ..Self::default()
        }
    }

    /// Apply to `prompt`. `id` and `created_at` are never changed;
    /// `updated_at` is always refreshed.
    pub fn apply(self, prompt: &mut Prompt) {
        if let Some(title) = self.title {
            prompt.title = title;
        }
        if let Some(content) = self.content {
            prompt.content = content;
        }
        if let Some(description) = self.description {
            prompt.description = description;
        }
        if let Some(collection_id) = self.collection_id {
            prompt.collection_id = collection_id;
        }
        if let Some(tags) = self.tags {
            prompt.tags = tags;
        }
        prompt.touch();
    }
}
