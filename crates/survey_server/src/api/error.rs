//! HTTP error mapping for survey handlers.
//!
//! # Invariants
//! - Absent surveys surface as `404`, never as an empty `200`.
//! - Error bodies are always `{ "error": string }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use survey_core::RepoError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// The request was cancelled before the store finished.
    Unavailable(String),
    Internal(String),
    /// The request body was refused before reaching a handler.
    Rejected(StatusCode, String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected(status, _) => *status,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unavailable(message)
            | Self::Internal(message)
            | Self::Rejected(_, message) => message,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::NotFound(value.to_string()),
            RepoError::Conflict(_) => Self::Conflict(value.to_string()),
            RepoError::InvalidArgument(_) => Self::BadRequest(value.to_string()),
            RepoError::Cancelled => Self::Unavailable(value.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Rejected(value.status(), value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=request_failed module=api status={} error={}",
                status.as_u16(),
                self.message()
            );
        } else {
            warn!(
                "event=request_rejected module=api status={} error={}",
                status.as_u16(),
                self.message()
            );
        }

        // Store internals stay in the log.
        let message = match self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.message().to_string(),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use survey_core::{EntityError, RepoError};
    use uuid::Uuid;

    #[test]
    fn repo_errors_map_to_documented_statuses() {
        let id = Uuid::new_v4();
        let cases = [
            (RepoError::NotFound(id), StatusCode::NOT_FOUND),
            (RepoError::Conflict(id), StatusCode::CONFLICT),
            (RepoError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (
                RepoError::InvalidArgument(EntityError::InvalidArgument("nil id")),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepoError::InvalidData("bad row".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn internal_error_body_hides_details() {
        let response = ApiError::from(RepoError::InvalidData("secret row".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
    }
}
