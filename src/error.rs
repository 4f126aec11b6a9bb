use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::models::ValidationError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error
    ConfigError(String),
    /// Missing or malformed request input
    BadRequest(String),
    /// Line items failed validation
    Validation(ValidationError),
    /// The LLM answered with something that is not a change order
    LlmResponse(String),
    /// Upstream API error
    UpstreamError { status: StatusCode, message: String },
    /// HTTP request error (preserves reqwest::Error for retry classification)
    HttpRequest(reqwest::Error),
    /// Upload or local write failed
    StorageError(String),
    /// Workbook could not be written
    RenderError(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Validation(err) => write!(f, "Invalid change order: {}", err),
            Self::LlmResponse(msg) => write!(f, "Invalid LLM response: {}", msg),
            Self::UpstreamError { status, message } => {
                write!(f, "Upstream error ({}): {}", status, message)
            }
            Self::HttpRequest(err) => write!(f, "HTTP request error: {}", err),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::RenderError(msg) => write!(f, "Render error: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::HttpRequest(err) => Some(err),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) | Self::LlmResponse(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UpstreamError { .. } | Self::HttpRequest(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigError(_)
            | Self::StorageError(_)
            | Self::RenderError(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            Self::UpstreamError { status, message } => {
                format!("LLM provider returned {}: {}", status, message)
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error_type = error_type_name(&self), "{}", error_message);
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

pub(crate) fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::BadRequest(_) => "bad_request",
        AppError::Validation(_) => "validation_error",
        AppError::LlmResponse(_) => "llm_response_error",
        AppError::UpstreamError { .. } => "upstream_error",
        AppError::HttpRequest(_) => "http_request_error",
        AppError::StorageError(_) => "storage_error",
        AppError::RenderError(_) => "render_error",
        AppError::InternalError(_) => "internal_error",
    }
}

// Implement conversions from common error types
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpRequest(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::LlmResponse(format!("JSON error: {}", err))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}
