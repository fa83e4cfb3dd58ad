pub mod handlers;

use axum::routing::get;
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prompts", get(handlers::list_prompts).post(handlers::create_prompt))
        .route(
            "/prompts/{id}",
            get(handlers::get_prompt)
                .put(handlers::replace_prompt)
                .patch(handlers::patch_prompt)
                .delete(handlers::delete_prompt),
        )
        .route("/prompts/{id}/variables", get(handlers::get_variables))
}
