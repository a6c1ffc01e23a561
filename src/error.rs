//! Request-level error taxonomy and HTTP mapping.
//!
//! Everything below the endpoint boundary returns `ApiError`; the
//! `IntoResponse` impl is the single place where errors become status codes
//! and client-visible text. Store and pool failures keep their detail on the
//! server side (logged via `tracing`) and reach the client as a generic
//! message only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or policy-violating input (400).
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation on a live row (409).
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials on login, or an invalid/expired reset token (401).
    /// The message is deliberately generic — no account-existence disclosure.
    #[error("{0}")]
    Unauthorized(String),

    /// Missing, invalid, or stale session assertion (401).
    #[error("invalid or expired session")]
    Unauthenticated,

    /// Referenced parent entity absent (404).
    #[error("{0}")]
    NotFound(String),

    /// Connection/pool failure — safe for the caller to retry (500).
    #[error("datastore temporarily unavailable")]
    TransientStore(#[source] r2d2::Error),

    /// Unexpected/unclassified failure (500). Full detail stays server-side.
    #[error("an error has occurred")]
    Fatal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::TransientStore(_) | Self::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn fatal(err: impl Into<anyhow::Error>) -> Self {
        Self::Fatal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::TransientStore(e) => {
                tracing::error!(error = %e, "store connection failure");
            }
            ApiError::Fatal(e) => {
                tracing::error!(error = ?e, "unclassified request failure");
            }
            _ => {}
        }
        let body = Json(serde_json::json!({"success": false, "error": self.to_string()}));
        (self.status(), body).into_response()
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        Self::TransientStore(err)
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Fatal(err.into())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Fatal(err.into())
    }
}
