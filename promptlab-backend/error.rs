use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hyper::StatusCode;
use serde_json::json;

/// Errors surfaced by prompt, collection and tag operations.
///
/// Repository implementations report I/O failures as `anyhow::Error`; those
/// arrive here as `Internal` and are never echoed back to HTTP clients.
#[derive(thiserror::Error, Debug)]
pub enum PromptLabError {
    #[error("{0}")]
    NotFound(String),

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[allow(dead_code)]
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PromptLabError>;

impl PromptLabError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error kind used in the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation { .. } => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for PromptLabError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation { field, message } => json!({
                "error": self.kind(),
                "message": message,
                "field": field,
            }),
            Self::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), "request failed");
                json!({
                    "error": self.kind(),
                    "message": "internal server error",
                })
            }
            _ => json!({
                "error": self.kind(),
                "message": self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for PromptLabError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation("body", rejection.body_text())
    }
}

impl From<QueryRejection> for PromptLabError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation("query", rejection.body_text())
    }
}
