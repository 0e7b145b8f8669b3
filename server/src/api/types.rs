//! Shared API types
//!
//! Error responses and the mapping of domain errors onto HTTP status codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::DataError;
use crate::domain::{QueryError, SessionError, ValidationError};

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    ServiceUnavailable { code: String, message: String },
    Internal { code: String, message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn service_unavailable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn from_data(e: DataError) -> Self {
        Self::from(QueryError::from(e))
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::bad_request("INVALID_FILTER", e.to_string())
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        let message = e.status_text();
        match e {
            QueryError::Validation(_) => Self::bad_request("INVALID_FILTER", message),
            QueryError::Configuration(detail) => {
                tracing::error!(detail = %detail, "Query configuration error");
                Self::internal("CONFIGURATION_ERROR", message)
            }
            QueryError::Connectivity(source) => {
                tracing::error!(error = %source, "Structure store unavailable");
                Self::service_unavailable("STORE_UNAVAILABLE", message)
            }
            QueryError::DataIntegrity { .. } => Self::internal("DATA_INTEGRITY", message),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(id) => {
                Self::not_found("SESSION_NOT_FOUND", format!("Session not found: {}", id))
            }
            SessionError::CapacityReached(max) => Self::service_unavailable(
                "TOO_MANY_SESSIONS",
                format!("Session limit of {} reached, try again later", max),
            ),
            SessionError::UnknownPreset(name) => {
                Self::bad_request("UNKNOWN_PRESET", format!("Unknown preset: {}", name))
            }
            SessionError::Stale => Self::conflict(
                "STALE_QUERY",
                "Query superseded by a newer request or filter change",
            ),
            SessionError::Validation(e) => Self::from(e),
            SessionError::Query(e) => Self::from(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Conflict { code, message } => (StatusCode::CONFLICT, "conflict", code, message),
            Self::ServiceUnavailable { code, message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                code,
                message,
            ),
            Self::Internal { code, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                code,
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
