use axum::extract::Request;
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use hyper::header;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::middleware;
use super::AppState;
use crate::error::PromptLabError;
use crate::models::HealthResponse;

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(super::prompts::router())
        .merge(super::tags::router())
        .merge(super::collections::router())
        .fallback(not_found)
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(axum::middleware::from_fn(middleware::strip_trailing_slash))
        .layer(axum::middleware::from_fn(middleware::trace_requests))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn not_found(req: Request) -> impl IntoResponse {
    tracing::warn!("unhandled path: {}", req.uri());
    PromptLabError::not_found(format!("no route for {} {}", req.method(), req.uri().path()))
}
