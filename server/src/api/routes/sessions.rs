//! Filter session endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::query::{ProjectionRequest, QueryResponse, resolve_projection};
use crate::api::extractors::{FilterPath, SessionPath, ValidatedJson};
use crate::api::types::ApiError;
use crate::domain::{FilterState, QueryExecutor, Selection, SelectionSpec, Session, SessionStore};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct SessionsApiState {
    pub executor: Arc<QueryExecutor>,
    pub sessions: Arc<SessionStore>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateSessionRequest {
    /// Preset whose stored filters seed the session
    #[validate(length(min = 1, max = 128))]
    pub preset: Option<String>,
}

/// New selection of one quantity: exactly one of `range` or `labels`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetFilterRequest {
    /// `[lo, hi]` for a float quantity
    #[validate(length(equal = 2))]
    pub range: Option<Vec<f64>>,
    /// Selected labels for a categorical quantity; may be empty
    pub labels: Option<Vec<String>>,
}

impl SetFilterRequest {
    fn into_spec(self) -> Result<SelectionSpec, ApiError> {
        match (self.range.as_deref(), self.labels) {
            (Some(&[lo, hi]), None) => Ok(SelectionSpec::Range([lo, hi])),
            (None, Some(labels)) => Ok(SelectionSpec::Labels(labels)),
            _ => Err(ApiError::bad_request(
                "INVALID_SELECTION",
                "Provide exactly one of 'range' or 'labels'",
            )),
        }
    }
}

/// Current selection of one filter
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterDto {
    pub quantity: String,
    pub label: String,
    /// `{"type": "float", lo, hi}` or `{"type": "categorical", selected}`
    #[schema(value_type = Object)]
    pub selection: Selection,
    /// Whether the selection differs from the full range or label set
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: String,
    pub filters: Vec<FilterDto>,
}

impl SessionResponse {
    fn new(session: &Session, filters: &FilterState) -> Self {
        let catalog = filters.catalog();
        // Listed filters first, then any active quantity set through a preset
        let mut names: Vec<&str> = catalog.filters().iter().map(String::as_str).collect();
        for (name, _) in filters.active() {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let dtos = names
            .into_iter()
            .filter_map(|name| {
                let quantity = catalog.quantity(name)?;
                Some(FilterDto {
                    quantity: name.to_string(),
                    label: quantity.display_label(),
                    selection: filters.selection(name)?,
                    active: filters.is_active(name),
                })
            })
            .collect();

        Self {
            id: session.id().to_string(),
            filters: dtos,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(executor: Arc<QueryExecutor>, sessions: Arc<SessionStore>) -> Router<()> {
    let state = SessionsApiState { executor, sessions };
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_session).delete(delete_session))
        .route("/{session_id}/filters", axum::routing::delete(reset_filters))
        .route(
            "/{session_id}/filters/{quantity}",
            put(set_filter).delete(reset_filter),
        )
        .route("/{session_id}/query", post(query_session))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Open a filter session
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Unknown preset"),
        (status = 503, description = "Session limit reached")
    )
)]
pub async fn create_session(
    State(state): State<SessionsApiState>,
    ValidatedJson(req): ValidatedJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state.sessions.create(req.preset.as_deref())?;
    let filters = session.snapshot();
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(&session, &filters)),
    ))
}

/// Get the current filter selections
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = String, Path, description = "Session UUID")),
    responses(
        (status = 200, description = "Session filters", body = SessionResponse),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_session(
    State(state): State<SessionsApiState>,
    path: SessionPath,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.sessions.get(path.session_id)?;
    let filters = session.snapshot();
    Ok(Json(SessionResponse::new(&session, &filters)))
}

/// Close a session
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = String, Path, description = "Session UUID")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn delete_session(
    State(state): State<SessionsApiState>,
    path: SessionPath,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(path.session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set the selection of one quantity
///
/// Body is `{"range": [lo, hi]}` for float quantities or `{"labels": [..]}`
/// for categorical ones. A rejected selection leaves the session unchanged.
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/filters/{quantity}",
    tag = "sessions",
    params(
        ("session_id" = String, Path, description = "Session UUID"),
        ("quantity" = String, Path, description = "Quantity name")
    ),
    request_body = SetFilterRequest,
    responses(
        (status = 200, description = "Updated filters", body = SessionResponse),
        (status = 400, description = "Invalid selection"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn set_filter(
    State(state): State<SessionsApiState>,
    path: FilterPath,
    ValidatedJson(req): ValidatedJson<SetFilterRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let spec = req.into_spec()?;
    let session = state.sessions.get(path.session_id)?;
    session.update(|filters| filters.apply(&path.quantity, &spec))?;
    let filters = session.snapshot();
    Ok(Json(SessionResponse::new(&session, &filters)))
}

/// Reset one quantity to its full range or label set
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{session_id}/filters/{quantity}",
    tag = "sessions",
    params(
        ("session_id" = String, Path, description = "Session UUID"),
        ("quantity" = String, Path, description = "Quantity name")
    ),
    responses(
        (status = 200, description = "Updated filters", body = SessionResponse),
        (status = 400, description = "Unknown quantity"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn reset_filter(
    State(state): State<SessionsApiState>,
    path: FilterPath,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.sessions.get(path.session_id)?;
    session.update(|filters| filters.reset(&path.quantity))?;
    let filters = session.snapshot();
    Ok(Json(SessionResponse::new(&session, &filters)))
}

/// Reset every filter
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{session_id}/filters",
    tag = "sessions",
    params(("session_id" = String, Path, description = "Session UUID")),
    responses(
        (status = 200, description = "Updated filters", body = SessionResponse),
        (status = 404, description = "Session not found")
    )
)]
pub async fn reset_filters(
    State(state): State<SessionsApiState>,
    path: SessionPath,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.sessions.get(path.session_id)?;
    session.update(|filters| {
        filters.reset_all();
        Ok(())
    })?;
    let filters = session.snapshot();
    Ok(Json(SessionResponse::new(&session, &filters)))
}

/// Query with the session's filters
///
/// Returns 409 when a filter change or a newer query superseded this one
/// while it was running.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/query",
    tag = "sessions",
    params(("session_id" = String, Path, description = "Session UUID")),
    request_body = ProjectionRequest,
    responses(
        (status = 200, description = "Plot-ready result set", body = QueryResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Superseded by a newer request"),
        (status = 503, description = "Structure store unavailable")
    )
)]
pub async fn query_session(
    State(state): State<SessionsApiState>,
    path: SessionPath,
    ValidatedJson(req): ValidatedJson<ProjectionRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let session = state.sessions.get(path.session_id)?;
    let (projection, _) = resolve_projection(&state.executor, &req)?;
    let outcome = session.query(&state.executor, &projection).await?;
    Ok(Json(outcome.into()))
}
