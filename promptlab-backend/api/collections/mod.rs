pub mod handlers;

use axum::routing::get;
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/collections",
            get(handlers::list_collections).post(handlers::create_collection),
        )
        .route(
            "/collections/{id}",
            get(handlers::get_collection).delete(handlers::delete_collection),
        )
}
