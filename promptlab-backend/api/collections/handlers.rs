use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use hyper::StatusCode;

use crate::api::AppState;
use crate::collections::CollectionView;
use crate::error::{PromptLabError, Result};
use crate::models::{CollectionList, CreateCollectionRequest};
use crate::prompts::PromptPatch;

pub(crate) async fn list_collections(State(state): State<AppState>) -> Json<CollectionList> {
    let prompts = state.prompt_repo.list().await;
    let collections: Vec<CollectionView> = state
        .collection_repo
        .list()
        .await
        .into_iter()
        .map(|c| CollectionView::resolve(c, &prompts))
        .collect();
    let total = collections.len();
    Json(CollectionList { collections, total })
}

pub(crate) async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CollectionView>> {
    let collection = state
        .collection_repo
        .get(&id)
        .await
        .ok_or_else(|| PromptLabError::not_found("collection not found"))?;
    let prompts = state.prompt_repo.list().await;
    Ok(Json(CollectionView::resolve(collection, &prompts)))
}

pub(crate) async fn create_collection(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CollectionView>)> {
    let Json(body) = body?;
    let draft = body.validate()?;
    let collection = state.collection_repo.create(draft).await?;
    tracing::info!(collection_id = %collection.id, name = %collection.name, "created collection");

    // A fresh collection has no members yet.
    Ok((
        StatusCode::CREATED,
        Json(CollectionView::resolve(collection, &[])),
    ))
}

/// Deleting a collection keeps its prompts; their `collection_id` is cleared.
pub(crate) async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !state.collection_repo.delete(&id).await? {
        return Err(PromptLabError::not_found("collection not found"));
    }

    let members: Vec<String> = state
        .prompt_repo
        .list()
        .await
        .into_iter()
        .filter(|p| p.collection_id.as_deref() == Some(id.as_str()))
        .map(|p| p.id)
        .collect();
    for prompt_id in &members {
        state
            .prompt_repo
            .update(prompt_id, PromptPatch::clear_collection())
            .await?;
    }

    tracing::info!(collection_id = %id, orphaned = members.len(), "deleted collection");
    Ok(StatusCode::NO_CONTENT)
}
