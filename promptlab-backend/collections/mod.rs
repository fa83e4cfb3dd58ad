pub mod file_repository;
pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prompts::Prompt;

/// A named grouping of prompts. Membership lives on the prompt side
/// (`Prompt::collection_id`); see [`CollectionView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    pub fn from_draft(draft: CollectionDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectionDraft {
    pub name: String,
    pub description: Option<String>,
}

/// A collection together with the ids of the prompts that currently
/// reference it, in prompt insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionView {
    #[serde(flatten)]
    pub collection: Collection,
    pub prompt_ids: Vec<String>,
}

impl CollectionView {
    pub fn resolve(collection: Collection, prompts: &[Prompt]) -> Self {
        let prompt_ids = prompts
            .iter()
            .filter(|p| p.collection_id.as_deref() == Some(collection.id.as_str()))
            .map(|p| p.id.clone())
            .collect();
        Self {
            collection,
            prompt_ids,
        }
    }
}
