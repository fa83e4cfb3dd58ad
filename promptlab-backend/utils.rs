//! Pure helpers over in-memory prompt lists: sorting, searching, filtering,
//! and template variable extraction.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PromptLabError, Result};
use crate::prompts::Prompt;
use crate::tags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Created,
    Updated,
    Title,
}

impl SortKey {
    /// Dates read newest-first, titles alphabetically.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortKey::Created | SortKey::Updated => SortDirection::Descending,
            SortKey::Title => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortKey {
    type Err = PromptLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "created" | "created_at" => Ok(SortKey::Created),
            "updated" | "updated_at" => Ok(SortKey::Updated),
            "title" => Ok(SortKey::Title),
            other => Err(PromptLabError::validation(
                "sort",
                format!("unknown sort key '{other}', expected created, updated or title"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = PromptLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(PromptLabError::validation(
                "order",
                format!("unknown sort order '{other}', expected asc or desc"),
            )),
        }
    }
}

/// Stable sort: prompts comparing equal keep their input order in either
/// direction.
pub fn sort_prompts(
    mut prompts: Vec<Prompt>,
    key: SortKey,
    direction: SortDirection,
) -> Vec<Prompt> {
    let compare = |a: &Prompt, b: &Prompt| -> Ordering {
        match key {
            SortKey::Created => a.created_at.cmp(&b.created_at),
            SortKey::Updated => a.updated_at.cmp(&b.updated_at),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    };
    match direction {
        SortDirection::Ascending => prompts.sort_by(compare),
        SortDirection::Descending => prompts.sort_by(|a, b| compare(b, a)),
    }
    prompts
}

/// Case-insensitive substring search over title, content and description.
pub fn search_prompts(prompts: Vec<Prompt>, query: &str) -> Vec<Prompt> {
    let needle = query.to_lowercase();
    prompts
        .into_iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.content.to_lowercase().contains(&needle)
                || p
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPredicate {
    /// Holds a normalized tag; build with [`PromptPredicate::tag`].
    Tag(String),
    Collection(String),
}

impl PromptPredicate {
    pub fn tag(raw: &str) -> Result<Self> {
        tags::normalize_tag(raw).map(PromptPredicate::Tag)
    }

    pub fn matches(&self, prompt: &Prompt) -> bool {
        match self {
            PromptPredicate::Tag(tag) => tags::has_tag(prompt, tag),
            PromptPredicate::Collection(id) => prompt.collection_id.as_deref() == Some(id.as_str()),
        }
    }
}

/// Keep prompts matching every predicate. No predicates keeps everything.
pub fn filter_prompts(prompts: Vec<Prompt>, predicates: &[PromptPredicate]) -> Vec<Prompt> {
    prompts
        .into_iter()
        .filter(|p| predicates.iter().all(|pred| pred.matches(p)))
        .collect()
}

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("variable pattern is valid"));

/// Names of `{{variable}}` placeholders in order of appearance, duplicates kept.
pub fn extract_variables(content: &str) -> Vec<String> {
    VARIABLE_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}
