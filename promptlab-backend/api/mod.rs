pub mod collections;
pub mod middleware;
pub mod prompts;
mod routes;
pub mod tags;

#[cfg(test)]
mod tests;

use axum::Router;
use std::sync::Arc;

use crate::collections::repository::CollectionRepository;
use crate::prompts::repository::PromptRepository;

/// Shared handler state. Constructed once at startup; the repositories are
/// the only owners of persisted data.
#[derive(Clone)]
pub struct AppState {
    pub prompt_repo: Arc<dyn PromptRepository>,
    pub collection_repo: Arc<dyn CollectionRepository>,
}

/// `cors_origins` empty means any origin is allowed.
pub fn create_app(state: AppState, cors_origins: &[String]) -> Router {
    routes::build_router(state, cors_origins)
}
