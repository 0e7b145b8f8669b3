//! Path and validation extractors for API routes

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

/// Maximum length for quantity and structure names in paths
pub const MAX_NAME_LENGTH: usize = 256;

/// Validate a name path segment: 1-256 chars, no control characters
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LENGTH && !name.chars().any(char::is_control)
}

/// Raw path extractor for session routes (internal use)
#[derive(Debug, Deserialize)]
struct SessionPathRaw {
    session_id: String,
}

/// Validated session path extractor.
///
/// Parses `session_id` as a UUID. Returns a 400 Bad Request otherwise.
#[derive(Debug)]
pub struct SessionPath {
    pub session_id: Uuid,
}

impl<S> FromRequestParts<S> for SessionPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<SessionPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        let session_id =
            Uuid::parse_str(&raw.session_id).map_err(|_| ValidationRejection::InvalidSessionId)?;
        Ok(Self { session_id })
    }
}

/// Raw path extractor for session filter routes (internal use)
#[derive(Debug, Deserialize)]
struct FilterPathRaw {
    session_id: String,
    quantity: String,
}

/// Validated session filter path extractor.
#[derive(Debug)]
pub struct FilterPath {
    pub session_id: Uuid,
    pub quantity: String,
}

impl<S> FromRequestParts<S> for FilterPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<FilterPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        let session_id =
            Uuid::parse_str(&raw.session_id).map_err(|_| ValidationRejection::InvalidSessionId)?;
        if !is_valid_name(&raw.quantity) {
            return Err(ValidationRejection::InvalidName("quantity"));
        }
        Ok(Self {
            session_id,
            quantity: raw.quantity,
        })
    }
}

/// Raw path extractor for structure routes (internal use)
#[derive(Debug, Deserialize)]
struct StructurePathRaw {
    name: String,
}

/// Validated structure name path extractor.
#[derive(Debug)]
pub struct StructurePath {
    pub name: String,
}

impl<S> FromRequestParts<S> for StructurePath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<StructurePathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        if !is_valid_name(&raw.name) {
            return Err(ValidationRejection::InvalidName("name"));
        }
        Ok(Self { name: raw.name })
    }
}

/// Validation rejection with structured error response
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// session_id is not a UUID
    InvalidSessionId,
    /// Name segment empty, too long, or containing control characters
    InvalidName(&'static str),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            Self::Path(rejection) => ("PATH_PARSE_ERROR", rejection.body_text()),
            Self::InvalidSessionId => (
                "INVALID_SESSION_ID",
                "Invalid session_id: must be a UUID".to_string(),
            ),
            Self::InvalidName(field) => (
                "INVALID_NAME",
                format!("Invalid {}: must be 1-{} characters", field, MAX_NAME_LENGTH),
            ),
            Self::Json(rejection) => ("JSON_PARSE_ERROR", rejection.body_text()),
            Self::Validation(errors) => ("VALIDATION_ERROR", format_validation_errors(&errors)),
        };
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// JSON body extractor with automatic validation.
///
/// Deserializes JSON body and validates it using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("pore_diameter"));
        assert!(is_valid_name("Cu-BTC"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("bad\nname"));
        assert!(!is_valid_name(&"a".repeat(MAX_NAME_LENGTH + 1)));
    }
}
