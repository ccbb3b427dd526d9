use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {message}")]
    NotFound { code: &'static str, message: String },

    #[error("Validation error: {message}")]
    ValidationError { code: &'static str, message: String },

    /// Two clients raced for the same slot; the caller should pick another one.
    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },

    /// The request no longer matches the schedule it was built from.
    #[error("Unprocessable: {message}")]
    Unprocessable { code: &'static str, message: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { code, .. }
            | AppError::ValidationError { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Unprocessable { code, .. } => code,
            AppError::Database(_) => "STORAGE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::NotFound { message, .. }
            | AppError::ValidationError { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Unprocessable { message, .. } => message.clone(),
            // Storage details stay in the logs.
            AppError::Database(_) => "Storage unavailable".to_string(),
        };

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, self);
        } else {
            tracing::debug!("Rejected request: {} ({})", message, code);
        }

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
