//! Response envelope and error mapping for the HTTP API.

use crate::errors::{Error, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Message returned in place of storage and environment failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Uniform response body: `{ success, data }` or `{ success, error }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a successful payload.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Result type returned by every handler.
pub type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, self.to_string()),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ErrorKind::Internal => {
                error!("Request failed: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}
