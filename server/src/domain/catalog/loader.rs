//! Catalog files
//!
//! Reads `columns.json`, `filters.json` and `presets.json` from the catalog
//! directory and validates them into a [`Catalog`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{Catalog, CategoryLabel, Preset, Quantity, QuantityKind};
use crate::core::constants::{CATALOG_COLUMNS_FILE, CATALOG_FILTERS_FILE, CATALOG_PRESETS_FILE};
use crate::domain::filter::{FilterState, SelectionSpec};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

impl CatalogError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ColumnType {
    Float,
    Categorical,
}

#[derive(Debug, Deserialize)]
struct ColumnEntry {
    column: String,
    label: Option<String>,
    #[serde(rename = "type")]
    kind: ColumnType,
    range: Option<[f64; 2]>,
    values: Option<Vec<String>>,
    #[serde(default)]
    colors: HashMap<String, String>,
    #[serde(default)]
    unit: String,
    description: Option<String>,
}

impl ColumnEntry {
    fn into_quantity(self) -> Result<Quantity, CatalogError> {
        let kind = match self.kind {
            ColumnType::Float => {
                let [min, max] = self.range.ok_or_else(|| {
                    CatalogError::invalid(format!(
                        "float quantity '{}' needs a range",
                        self.column
                    ))
                })?;
                QuantityKind::Float { min, max }
            }
            ColumnType::Categorical => {
                let values = self.values.ok_or_else(|| {
                    CatalogError::invalid(format!(
                        "categorical quantity '{}' needs values",
                        self.column
                    ))
                })?;
                if let Some(unknown) = self.colors.keys().find(|k| !values.contains(k)) {
                    return Err(CatalogError::invalid(format!(
                        "categorical quantity '{}' has a colour for unknown label '{}'",
                        self.column, unknown
                    )));
                }
                QuantityKind::Categorical {
                    labels: values
                        .into_iter()
                        .map(|label| CategoryLabel {
                            color: self.colors.get(&label).cloned(),
                            label,
                        })
                        .collect(),
                }
            }
        };
        Ok(Quantity {
            label: self.label.unwrap_or_else(|| self.column.clone()),
            name: self.column,
            unit: self.unit,
            description: self.description,
            kind,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PresetEntry {
    x: String,
    y: String,
    #[serde(default)]
    clr: String,
    #[serde(default)]
    filters: BTreeMap<String, SelectionSpec>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate the catalog from a directory
pub fn load_catalog(dir: &Path) -> Result<Arc<Catalog>, CatalogError> {
    let columns: Vec<ColumnEntry> = read_json(&dir.join(CATALOG_COLUMNS_FILE))?;
    let filters: Vec<String> = read_json(&dir.join(CATALOG_FILTERS_FILE))?;
    let presets: BTreeMap<String, PresetEntry> = read_json(&dir.join(CATALOG_PRESETS_FILE))?;

    let quantities = columns
        .into_iter()
        .map(ColumnEntry::into_quantity)
        .collect::<Result<Vec<_>, _>>()?;
    let presets = presets
        .into_iter()
        .map(|(name, entry)| Preset {
            name,
            x: entry.x,
            y: entry.y,
            clr: entry.clr,
            filters: entry.filters,
        })
        .collect();

    let catalog = Arc::new(Catalog::new(quantities, filters, presets)?);

    // Stored preset filters must be valid selections
    for preset in catalog.presets() {
        FilterState::new(catalog.clone())
            .apply_preset(preset)
            .map_err(|e| CatalogError::invalid(format!("preset '{}': {}", preset.name, e)))?;
    }

    tracing::debug!(
        dir = %dir.display(),
        quantities = catalog.quantities().len(),
        filters = catalog.filters().len(),
        presets = catalog.presets().len(),
        "Catalog loaded"
    );
    Ok(catalog)
}
