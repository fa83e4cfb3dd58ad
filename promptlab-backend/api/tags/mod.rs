pub mod handlers;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(handlers::list_tags))
        .route("/tags/{tag}/prompts", get(handlers::prompts_with_tag))
        .route("/prompts/{id}/tags", post(handlers::add_tags))
        .route("/prompts/{id}/tags/{tag}", delete(handlers::remove_tag))
}
