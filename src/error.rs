use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Caller input is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A referenced restaurant, menu item, order or user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The payment processor failed or answered with something unusable.
    #[error("{0}")]
    Upstream(String),

    /// Webhook body could not be authenticated.
    #[error("Webhook error: {0}")]
    InvalidSignature(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            AppError::Upstream(detail) => {
                tracing::warn!(error = %detail, "payment provider error");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
