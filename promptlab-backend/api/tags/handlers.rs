use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::AppState;
use crate::error::Result;
use crate::models::{PromptList, TagList, TagRequest};
use crate::prompts::Prompt;
use crate::tags;

pub(crate) async fn list_tags(State(state): State<AppState>) -> Json<TagList> {
    Json(TagList {
        tags: tags::list_tags(state.prompt_repo.as_ref()).await,
    })
}

pub(crate) async fn prompts_with_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<PromptList>> {
    let prompts = tags::filter_by_tag(state.prompt_repo.as_ref(), &tag).await?;
    Ok(Json(PromptList::from(prompts)))
}

pub(crate) async fn add_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<TagRequest>, JsonRejection>,
) -> Result<Json<Prompt>> {
    let Json(body) = body?;
    let requested = body.into_tags()?;
    let repo = state.prompt_repo.as_ref();

    let prompt = match requested.as_slice() {
        [single] => tags::add_tag(repo, &id, single).await?,
        many => tags::add_tags(repo, &id, many).await?,
    };
    Ok(Json(prompt))
}

pub(crate) async fn remove_tag(
    State(state): State<AppState>,
    Path((id, tag)): Path<(String, String)>,
) -> Result<Json<Prompt>> {
    let prompt = tags::remove_tag(state.prompt_repo.as_ref(), &id, &tag).await?;
    Ok(Json(prompt))
}
