use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Voice list unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Synthesis failed: {0}")]
    RemoteError(String),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn invalid_fields(details: Vec<FieldError>) -> Self {
        AppError::InvalidRequest {
            message: "Request failed validation".into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest { .. } | AppError::UnknownVoice(_) => StatusCode::BAD_REQUEST,
            AppError::RemoteUnavailable(_) | AppError::RemoteError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            message: "Malformed JSON body".into(),
            details: vec![FieldError::new("body", rejection.body_text())],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Value,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full detail goes to the log, the caller gets the short form
        tracing::error!(status = %self.status(), "Request failed: {:?}", self);

        let status = self.status();
        let (error, details) = match self {
            AppError::InvalidRequest { message, details } => {
                (message, serde_json::to_value(details).unwrap_or(Value::Null))
            }
            AppError::UnknownVoice(name) => (
                "Unknown voice".to_string(),
                Value::String(format!("Voice '{}' is not in the current voice list", name)),
            ),
            AppError::RemoteUnavailable(_) => (
                "Voice list unavailable".to_string(),
                Value::String("The speech service could not list voices".into()),
            ),
            AppError::RemoteError(msg) => ("Synthesis failed".to_string(), Value::String(msg)),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
