//! REST endpoints for prompts.
//!
//! GET    /prompts                  list, with optional tag / search / collection_id / sort / order
//! POST   /prompts                  create, 201
//! GET    /prompts/{id}             fetch one
//! PUT    /prompts/{id}             replace every editable field
//! PATCH  /prompts/{id}             change only the fields sent
//! DELETE /prompts/{id}             delete, 204
//! GET    /prompts/{id}/variables   `{{name}}` placeholders in the content
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use hyper::StatusCode;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::{PromptLabError, Result};
use crate::models::{CreatePromptRequest, PromptList, UpdatePromptRequest, VariableList};
use crate::prompts::{Prompt, PromptPatch};
use crate::utils::{self, PromptPredicate, SortDirection, SortKey};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListPromptsQuery {
    collection_id: Option<String>,
    search: Option<String>,
    tag: Option<String>,
    sort: Option<String>,
    order: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A referenced collection has to exist at the time of the write. Later
/// deletion of the collection orphans the prompt instead.
async fn ensure_collection_exists(state: &AppState, collection_id: Option<&str>) -> Result<()> {
    let Some(id) = collection_id else {
        return Ok(());
    };
    if state.collection_repo.get(id).await.is_none() {
        return Err(PromptLabError::validation(
            "collection_id",
            format!("collection not found: {id}"),
        ));
    }
    Ok(())
}

async fn ensure_prompt_exists(state: &AppState, id: &str) -> Result<()> {
    if state.prompt_repo.get(id).await.is_none() {
        return Err(PromptLabError::not_found("prompt not found"));
    }
    Ok(())
}

pub(crate) async fn list_prompts(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListPromptsQuery>, QueryRejection>,
) -> Result<Json<PromptList>> {
    let Query(query) = query?;

    // `tag` is validated even when present but blank.
    let mut predicates = Vec::new();
    if let Some(tag) = query.tag.as_deref() {
        predicates.push(PromptPredicate::tag(tag)?);
    }
    if let Some(collection_id) = non_empty(query.collection_id.as_deref()) {
        predicates.push(PromptPredicate::Collection(collection_id.to_string()));
    }

    let key = non_empty(query.sort.as_deref())
        .map(str::parse::<SortKey>)
        .transpose()?
        .unwrap_or(SortKey::Created);
    let direction = non_empty(query.order.as_deref())
        .map(str::parse::<SortDirection>)
        .transpose()?
        .unwrap_or_else(|| key.default_direction());

    let mut prompts = utils::filter_prompts(state.prompt_repo.list().await, &predicates);
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        prompts = utils::search_prompts(prompts, search);
    }
    let prompts = utils::sort_prompts(prompts, key, direction);

    Ok(Json(PromptList::from(prompts)))
}

pub(crate) async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Prompt>> {
    state
        .prompt_repo
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| PromptLabError::not_found("prompt not found"))
}

pub(crate) async fn create_prompt(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreatePromptRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Prompt>)> {
    let Json(body) = body?;
    let draft = body.validate()?;
    ensure_collection_exists(&state, draft.collection_id.as_deref()).await?;

    let prompt = state.prompt_repo.create(draft).await?;
    tracing::info!(prompt_id = %prompt.id, title = %prompt.title, "created prompt");
    Ok((StatusCode::CREATED, Json(prompt)))
}

pub(crate) async fn replace_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<CreatePromptRequest>, JsonRejection>,
) -> Result<Json<Prompt>> {
    ensure_prompt_exists(&state, &id).await?;
    let Json(body) = body?;
    let draft = body.validate()?;
    ensure_collection_exists(&state, draft.collection_id.as_deref()).await?;

    let prompt = state
        .prompt_repo
        .update(&id, PromptPatch::replace_with(draft))
        .await?
        .ok_or_else(|| PromptLabError::not_found("prompt not found"))?;
    tracing::info!(prompt_id = %id, "replaced prompt");
    Ok(Json(prompt))
}

pub(crate) async fn patch_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdatePromptRequest>, JsonRejection>,
) -> Result<Json<Prompt>> {
    ensure_prompt_exists(&state, &id).await?;
    let Json(body) = body?;
    let patch = body.validate()?;
    if let Some(Some(collection_id)) = &patch.collection_id {
        ensure_collection_exists(&state, Some(collection_id.as_str())).await?;
    }

    let prompt = state
        .prompt_repo
        .update(&id, patch)
        .await?
        .ok_or_else(|| PromptLabError::not_found("prompt not found"))?;
    tracing::info!(prompt_id = %id, "patched prompt");
    Ok(Json(prompt))
}

pub(crate) async fn delete_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !state.prompt_repo.delete(&id).await? {
        return Err(PromptLabError::not_found("prompt not found"));
    }
    tracing::info!(prompt_id = %id, "deleted prompt");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn get_variables(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VariableList>> {
    let prompt = state
        .prompt_repo
        .get(&id)
        .await
        .ok_or_else(|| PromptLabError::not_found("prompt not found"))?;
    Ok(Json(VariableList {
        variables: utils::extract_variables(&prompt.content),
    }))
}
