use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A booking refused by slot validation or by the upstream store.
    /// `conflict` selects 409 over 422.
    #[error("Booking rejected ({code}): {message}")]
    BookingRejected {
        code: String,
        message: String,
        conflict: bool,
    },

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BookingRejected { conflict: true, .. } => StatusCode::CONFLICT,
            AppError::BookingRejected { conflict: false, .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::BookingRejected { code, message, .. } => {
                tracing::warn!("Booking rejected: {} ({})", message, code);
                json!({
                    "error": message,
                    "code": code
                })
            }
            AppError::Auth(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ExternalService(msg) => {
                tracing::error!("Error: {}: {}", status, msg);
                json!({
                    "error": msg
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
