//! Structure detail endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::extractors::StructurePath;
use crate::api::types::ApiError;
use crate::data::StructureStore;
use crate::domain::detail::{PropertyRow, structure_properties};

#[derive(Clone)]
pub struct StructuresApiState {
    pub store: Arc<dyn StructureStore>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StructureResponse {
    pub name: String,
    /// `{property, value}` rows sorted by property label
    #[schema(value_type = Vec<Object>)]
    pub properties: Vec<PropertyRow>,
}

pub fn routes(store: Arc<dyn StructureStore>) -> Router<()> {
    let state = StructuresApiState { store };
    Router::new()
        .route("/{name}", get(get_structure))
        .with_state(state)
}

/// Property table of one structure
#[utoipa::path(
    get,
    path = "/api/v1/structures/{name}",
    tag = "structures",
    params(("name" = String, Path, description = "Structure display name")),
    responses(
        (status = 200, description = "Structure properties", body = StructureResponse),
        (status = 404, description = "Structure not found"),
        (status = 503, description = "Structure store unavailable")
    )
)]
pub async fn get_structure(
    State(state): State<StructuresApiState>,
    path: StructurePath,
) -> Result<Json<StructureResponse>, ApiError> {
    let properties = structure_properties(state.store.as_ref(), &path.name)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found(
                "STRUCTURE_NOT_FOUND",
                format!("Structure not found: {}", path.name),
            )
        })?;

    Ok(Json(StructureResponse {
        name: path.name,
        properties,
    }))
}
