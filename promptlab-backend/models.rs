//! HTTP request and response payloads.
//!
//! Request bodies deserialize loosely and are then turned into validated
//! drafts and patches; nothing reaches storage without passing through one of
//! the `validate` methods here.

use serde::{Deserialize, Deserializer, Serialize};

use crate::collections::{CollectionDraft, CollectionView};
use crate::error::{PromptLabError, Result};
use crate::prompts::{Prompt, PromptDraft, PromptPatch};
use crate::tags;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_COLLECTION_NAME_LEN: usize = 100;

fn required_text(field: &str, value: String, max_len: Option<usize>) -> Result<String> {
    if value.trim().is_empty() {
        return Err(PromptLabError::validation(field, format!("{field} must not be empty")));
    }
    if let Some(max) = max_len {
        if value.chars().count() > max {
            return Err(PromptLabError::validation(
                field,
                format!("{field} must be at most {max} characters"),
            ));
        }
    }
    Ok(value)
}

fn optional_text(field: &str, value: Option<String>, max_len: usize) -> Result<Option<String>> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(PromptLabError::validation(
            field,
            format!("{field} must be at most {max_len} characters"),
        )),
        other => Ok(other),
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn explicit_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Prompts ────────────────────────────────────────────────────────────────

/// Body of `POST /prompts` and `PUT /prompts/{id}`.
#[derive(Debug, Deserialize)]
pub struct CreatePromptRequest {
    pub title: String,
    #[serde(alias = "body")]
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreatePromptRequest {
    pub fn validate(self) -> Result<PromptDraft> {
        Ok(PromptDraft {
            title: required_text("title", self.title, Some(MAX_TITLE_LEN))?,
            content: required_text("content", self.content, None)?,
            description: optional_text("description", self.description, MAX_DESCRIPTION_LEN)?,
            collection_id: self.collection_id,
            tags: tags::normalize_tags(&self.tags)?,
        })
    }
}

/// Body of `PATCH /prompts/{id}`: only the fields present are changed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePromptRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "body")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub collection_id: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdatePromptRequest {
    pub fn validate(self) -> Result<PromptPatch> {
        Ok(PromptPatch {
            title: self
                .title
                .map(|t| required_text("title", t, Some(MAX_TITLE_LEN)))
                .transpose()?,
            content: self
                .content
                .map(|c| required_text("content", c, None))
                .transpose()?,
            description: self
                .description
                .map(|d| optional_text("description", d, MAX_DESCRIPTION_LEN))
                .transpose()?,
            collection_id: self.collection_id,
            tags: self.tags.map(|t| tags::normalize_tags(&t)).transpose()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PromptList {
    pub prompts: Vec<Prompt>,
    pub total: usize,
}

impl From<Vec<Prompt>> for PromptList {
    fn from(prompts: Vec<Prompt>) -> Self {
        Self {
            total: prompts.len(),
            prompts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VariableList {
    pub variables: Vec<String>,
}

// ── Tags ───────────────────────────────────────────────────────────────────

/// Body of `POST /prompts/{id}/tags`: either `{"tag": "x"}` or
/// `{"tags": ["x", "y"]}` (both may be given).
#[derive(Debug, Default, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TagRequest {
    /// The raw tags to add, single `tag` first. Normalization happens in
    /// [`crate::tags`]; this only checks that something was sent.
    pub fn into_tags(self) -> Result<Vec<String>> {
        let mut all: Vec<String> = self.tag.into_iter().collect();
        all.extend(self.tags);
        if all.is_empty() {
            return Err(PromptLabError::validation("tag", "either tag or tags is required"));
        }
        Ok(all)
    }
}

#[derive(Debug, Serialize)]
pub struct TagList {
    pub tags: Vec<String>,
}

// ── Collections ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateCollectionRequest {
    pub fn validate(self) -> Result<CollectionDraft> {
        Ok(CollectionDraft {
            name: required_text("name", self.name, Some(MAX_COLLECTION_NAME_LEN))?,
            description: optional_text("description", self.description, MAX_DESCRIPTION_LEN)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionList {
    pub collections: Vec<CollectionView>,
    pub total: usize,
}

// ── Misc ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
