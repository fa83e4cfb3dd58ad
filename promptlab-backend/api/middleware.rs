use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::Instrument;

/// Wrap each request in a span and log its outcome.
pub async fn trace_requests(req: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        let status = response.status();
        let latency_ms = started.elapsed().as_millis() as u64;

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), latency_ms, "request failed");
        } else {
            tracing::info!(status = status.as_u16(), latency_ms, "request completed");
        }
        response
    }
    .instrument(span)
    .await
}

/// Permanently redirect `/path/` to `/path`, keeping the query string.
pub async fn strip_trailing_slash(req: Request<Body>, next: Next) -> Response {
    let uri = req.uri();

    let stripped = uri
        .path()
        .strip_suffix('/')
        .filter(|path| !path.is_empty());

    let Some(path) = stripped else {
        return next.run(req).await;
    };

    let target = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    match target.parse::<Uri>() {
        Ok(new_uri) => Redirect::permanent(&new_uri.to_string()).into_response(),
        Err(_) => next.run(req).await,
    }
}
