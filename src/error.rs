use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use utoipa::ToSchema;

/// A single field-level validation failure, reported back to the form that submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending field, in its JSON (camelCase) spelling
    pub field: String,
    /// Human readable reason the value was rejected
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

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    InvalidRequest(String),
    Validation(Vec<FieldError>),
    Conflict(String),
    Unauthorized(String),
    Upstream(String),
    SerializationError(String),
    InternalError(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: impl fmt::Display) -> Self {
        AppError::NotFound(format!("{} {}", kind, id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(what) => write!(f, "Not found: {}", what),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::Validation(fields) => {
                let names: Vec<&str> = fields.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Validation failed: {}", names.join(", "))
            }
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::SerializationError(err.to_string())
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::Validation(fields) => Json(json!({
                "error": self.to_string(),
                "fields": fields,
            })),
            _ => Json(json!({
                "error": self.to_string(),
            })),
        };

        (status, body).into_response()
    }
}

/// Error body as rendered by [`AppError::into_response`].
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error message
    pub error: String,
    /// Present only for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ErrorBody {
    /// Rebuild the server-side error from a status code and body; used by the API client.
    pub fn into_app_error(self, status: StatusCode) -> AppError {
        let message = self.error;
        match status {
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::BAD_REQUEST => AppError::InvalidRequest(message),
            StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(self.fields.unwrap_or_default()),
            StatusCode::CONFLICT => AppError::Conflict(message),
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            s if s.is_server_error() => AppError::Upstream(format!("{}: {}", s, message)),
            s => AppError::Upstream(format!("unexpected status {}: {}", s, message)),
        }
    }
}
