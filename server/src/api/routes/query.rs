//! Stateless query endpoint

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::domain::{FilterState, Preset, Projection, QueryExecutor, QueryOutcome, Record, SelectionSpec};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct QueryApiState {
    pub executor: Arc<QueryExecutor>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Plot axes and colour, from a preset and/or explicit quantity names
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ProjectionRequest {
    /// Preset supplying the defaults; `default` when omitted
    #[validate(length(min = 1, max = 128))]
    pub preset: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub x: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub y: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub clr: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub projection: ProjectionRequest,
    /// Selections by quantity: `{"range": [lo, hi]}` or `{"labels": [..]}`
    #[serde(default)]
    #[schema(value_type = Object)]
    pub filters: BTreeMap<String, SelectionSpec>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    /// Plotted structures: `{x, y, color, name, reference}`
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<Record>,
    /// Number of matching structures before truncation
    pub total: u64,
    pub plotted: usize,
    pub truncated: bool,
    /// Status line, e.g. `120 frameworks found.\nPlotting 120...`
    pub status: String,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            truncated: outcome.is_truncated(),
            plotted: outcome.records.len(),
            total: outcome.total,
            status: outcome.status,
            records: outcome.records,
        }
    }
}

/// Resolve the requested preset and projection
pub(crate) fn resolve_projection<'a>(
    executor: &'a QueryExecutor,
    request: &ProjectionRequest,
) -> Result<(Projection, &'a Preset), ApiError> {
    let catalog = executor.catalog();
    let preset = match request.preset.as_deref() {
        Some(name) => catalog.preset(name).ok_or_else(|| {
            ApiError::bad_request("UNKNOWN_PRESET", format!("Unknown preset: {}", name))
        })?,
        None => catalog.default_preset(),
    };

    let mut projection = executor.preset_projection(preset);
    if let Some(x) = &request.x {
        projection.x = x.clone();
    }
    if let Some(y) = &request.y {
        projection.y = y.clone();
    }
    if let Some(clr) = &request.clr {
        projection.color = clr.clone();
    }
    catalog
        .check_projection(&projection.x, &projection.y, &projection.color)
        .map_err(|e| ApiError::bad_request("INVALID_PROJECTION", e))?;
    Ok((projection, preset))
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(executor: Arc<QueryExecutor>) -> Router<()> {
    let state = QueryApiState { executor };
    Router::new().route("/", post(run_query)).with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Run a one-off query without a session
///
/// A named preset contributes its stored filters; request filters are
/// applied on top of them.
#[utoipa::path(
    post,
    path = "/api/v1/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Plot-ready result set", body = QueryResponse),
        (status = 400, description = "Invalid projection or filter"),
        (status = 503, description = "Structure store unavailable")
    )
)]
pub async fn run_query(
    State(state): State<QueryApiState>,
    ValidatedJson(req): ValidatedJson<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let executor = &state.executor;
    let (projection, preset) = resolve_projection(executor, &req.projection)?;

    let mut filters = FilterState::new(executor.catalog().clone());
    if req.projection.preset.is_some() {
        filters.apply_preset(preset)?;
    }
    for (quantity, spec) in &req.filters {
        filters.apply(quantity, spec)?;
    }

    let outcome = executor.execute(&projection, &filters).await?;
    Ok(Json(outcome.into()))
}
