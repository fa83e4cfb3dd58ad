//! Tag normalization and the per-prompt tag operations.
//!
//! Every tag, whether stored or used as a query, goes through
//! [`normalize_tag`]: trimmed, lower-cased and non-empty. Tags being stored
//! also pass [`validate_tag`], which caps them at [`MAX_TAG_LEN`] characters.
//!
//! The repository-backed operations read the prompt, change it, and save it
//! back without holding a lock in between. Two overlapping mutations of the
//! same prompt can therefore lose one of the writes.

use std::collections::BTreeSet;

use crate::error::{PromptLabError, Result};
use crate::prompts::Prompt;
use crate::prompts::repository::PromptRepository;

pub const MAX_TAG_LEN: usize = 50;

pub fn normalize_tag(raw: &str) -> Result<String> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() {
        return Err(PromptLabError::validation(
            "tag",
            "tag cannot be empty or whitespace only",
        ));
    }
    Ok(tag)
}

/// Normalize a tag that is about to be stored.
pub fn validate_tag(raw: &str) -> Result<String> {
    let tag = normalize_tag(raw)?;
    if tag.chars().count() > MAX_TAG_LEN {
        return Err(PromptLabError::validation(
            "tag",
            format!("tag must be at most {MAX_TAG_LEN} characters"),
        ));
    }
    Ok(tag)
}

/// Validate a list of tags for storage, dropping duplicates but keeping the
/// first occurrence's position. Fails on the first invalid entry.
pub fn normalize_tags<I, S>(raw: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = validate_tag(tag.as_ref())?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

/// `tag` must already be normalized.
pub fn has_tag(prompt: &Prompt, tag: &str) -> bool {
    prompt.tags.iter().any(|t| t == tag)
}

/// Sorted union of the tags on `prompts`.
pub fn collect_tags<'a>(prompts: impl IntoIterator<Item = &'a Prompt>) -> Vec<String> {
    prompts
        .into_iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn load_prompt(repo: &dyn PromptRepository, prompt_id: &str) -> Result<Prompt> {
    repo.get(prompt_id)
        .await
        .ok_or_else(|| PromptLabError::not_found("prompt not found"))
}

pub async fn add_tag(
    repo: &dyn PromptRepository,
    prompt_id: &str,
    tag: &str,
) -> Result<Prompt> {
    add_tags(repo, prompt_id, std::slice::from_ref(&tag)).await
}

/// Add every tag in `tags` to the prompt. All tags are validated before the
/// prompt is touched; tags already present are skipped, and when nothing new
/// is added the prompt is returned unchanged without a write.
pub async fn add_tags<S: AsRef<str>>(
    repo: &dyn PromptRepository,
    prompt_id: &str,
    tags: &[S],
) -> Result<Prompt> {
    let tags = normalize_tags(tags)?;
    let mut prompt = load_prompt(repo, prompt_id).await?;

    let before = prompt.tags.len();
    for tag in tags {
        if !has_tag(&prompt, &tag) {
            prompt.tags.push(tag);
        }
    }
    if prompt.tags.len() == before {
        return Ok(prompt);
    }

    prompt.touch();
    repo.save(prompt.clone()).await?;
    tracing::info!(prompt_id, tags = ?prompt.tags, "added tags");
    Ok(prompt)
}

pub async fn remove_tag(
    repo: &dyn PromptRepository,
    prompt_id: &str,
    tag: &str,
) -> Result<Prompt> {
    let tag = normalize_tag(tag)?;
    let mut prompt = load_prompt(repo, prompt_id).await?;

    let Some(pos) = prompt.tags.iter().position(|t| *t == tag) else {
        return Err(PromptLabError::not_found("tag not found on this prompt"));
    };
    prompt.tags.remove(pos);
    prompt.touch();
    repo.save(prompt.clone()).await?;
    tracing::info!(prompt_id, tag = %tag, "removed tag");
    Ok(prompt)
}

pub async fn list_tags(repo: &dyn PromptRepository) -> Vec<String> {
    collect_tags(&repo.list().await)
}

pub async fn filter_by_tag(repo: &dyn PromptRepository, tag: &str) -> Result<Vec<Prompt>> {
    let tag = normalize_tag(tag)?;
    Ok(repo
        .list()
        .await
        .into_iter()
        .filter(|p| has_tag(p, &tag))
        .collect())
}
