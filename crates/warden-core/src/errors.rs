use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error returned by request handlers and extractors.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

/// Failures inside the authorization pipeline.
///
/// None of these reach the client: session resolution failures degrade to an
/// anonymous request, ban enforcement failures still redirect, and stamping
/// failures pass the response through untouched.
#[derive(Debug, thiserror::Error)]
pub enum GateFailure {
    #[error("session resolution failed: {0}")]
    SessionResolution(#[source] Error),

    #[error("ban enforcement failed: {0}")]
    BanEnforcement(#[source] Error),

    #[error("response stamping skipped: {0}")]
    Stamping(&'static str),
}

impl GateFailure {
    /// Short label used as a log field and metric tag.
    pub fn kind(&self) -> &'static str {
        match self {
            GateFailure::SessionResolution(_) => "session_resolution",
            GateFailure::BanEnforcement(_) => "ban_enforcement",
            GateFailure::Stamping(_) => "stamping",
        }
    }
}
