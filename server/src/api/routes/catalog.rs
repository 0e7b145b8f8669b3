//! Catalog discovery endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Catalog, Preset, Quantity};

#[derive(Clone)]
pub struct CatalogApiState {
    pub catalog: Arc<Catalog>,
    pub max_points: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    /// Every quantity with its type, range or labels, and unit
    #[schema(value_type = Vec<Object>)]
    pub quantities: Vec<Quantity>,
    /// Quantities exposed as filters, in display order
    pub filters: Vec<String>,
    /// Float quantities selectable as plot axes
    pub plot_quantities: Vec<String>,
    /// Named plot presets; `default` is always present
    #[schema(value_type = Vec<Object>)]
    pub presets: Vec<Preset>,
    /// Maximum number of points returned per query
    pub max_points: usize,
}

pub fn routes(catalog: Arc<Catalog>, max_points: usize) -> Router<()> {
    let state = CatalogApiState {
        catalog,
        max_points,
    };
    Router::new().route("/", get(get_catalog)).with_state(state)
}

/// Describe the quantities, filters and plot presets
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Quantity catalog", body = CatalogResponse)
    )
)]
pub async fn get_catalog(State(state): State<CatalogApiState>) -> Json<CatalogResponse> {
    let catalog = &state.catalog;
    Json(CatalogResponse {
        quantities: catalog.quantities().to_vec(),
        filters: catalog.filters().to_vec(),
        plot_quantities: catalog.plot_quantities().map(|q| q.name.clone()).collect(),
        presets: catalog.presets().to_vec(),
        max_points: state.max_points,
    })
}
