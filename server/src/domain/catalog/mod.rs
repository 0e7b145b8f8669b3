//! Quantity catalog
//!
//! The static description of every column the dashboard can filter on or
//! plot: its type, full range or label set, and unit. Loaded once at
//! start-up and shared read-only for the process lifetime.

mod loader;

pub use loader::{CatalogError, load_catalog};

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::core::constants::{DEFAULT_PRESET, GROUP_COLOR};
use crate::domain::filter::SelectionSpec;

/// One selectable label of a categorical quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLabel {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Declared type of a quantity, with its full (default) selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuantityKind {
    Float { min: f64, max: f64 },
    Categorical { labels: Vec<CategoryLabel> },
}

/// A named, typed column exposed for filtering and plotting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    pub name: String,
    pub label: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: QuantityKind,
}

impl Quantity {
    pub fn float(name: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            unit: String::new(),
            description: None,
            kind: QuantityKind::Float { min, max },
        }
    }

    pub fn categorical(name: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            unit: String::new(),
            description: None,
            kind: QuantityKind::Categorical {
                labels: labels
                    .iter()
                    .map(|l| CategoryLabel {
                        label: l.to_string(),
                        color: None,
                    })
                    .collect(),
            },
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self.kind, QuantityKind::Float { .. })
    }

    /// Full range of a float quantity
    pub fn range(&self) -> Option<(f64, f64)> {
        match self.kind {
            QuantityKind::Float { min, max } => Some((min, max)),
            QuantityKind::Categorical { .. } => None,
        }
    }

    /// Allowed labels of a categorical quantity, in catalog order
    pub fn labels(&self) -> Option<impl Iterator<Item = &str>> {
        match &self.kind {
            QuantityKind::Float { .. } => None,
            QuantityKind::Categorical { labels } => Some(labels.iter().map(|l| l.label.as_str())),
        }
    }

    /// Label decorated with its unit, e.g. `Pore diameter [A]`
    pub fn display_label(&self) -> String {
        if self.unit.is_empty() {
            self.label.clone()
        } else {
            format!("{} [{}]", self.label, self.unit)
        }
    }
}

/// A named default projection, optionally with stored filters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub name: String,
    pub x: String,
    pub y: String,
    pub clr: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, SelectionSpec>,
}

/// Read-only catalog of quantities, filters and presets
#[derive(Debug)]
pub struct Catalog {
    quantities: Vec<Quantity>,
    index: HashMap<String, usize>,
    filters: Vec<String>,
    presets: Vec<Preset>,
}

impl Catalog {
    /// Build and validate a catalog.
    ///
    /// Presets must include `default`; any preset given an empty `clr`
    /// inherits the default preset's colour.
    pub fn new(
        quantities: Vec<Quantity>,
        filters: Vec<String>,
        mut presets: Vec<Preset>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(quantities.len());
        for (i, quantity) in quantities.iter().enumerate() {
            validate_quantity(quantity)?;
            if index.insert(quantity.name.clone(), i).is_some() {
                return Err(CatalogError::invalid(format!(
                    "duplicate quantity '{}'",
                    quantity.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for name in &filters {
            if !index.contains_key(name) {
                return Err(CatalogError::invalid(format!(
                    "filter '{}' is not a known quantity",
                    name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(CatalogError::invalid(format!(
                    "filter '{}' listed twice",
                    name
                )));
            }
        }

        let default_clr = presets
            .iter()
            .find(|p| p.name == DEFAULT_PRESET)
            .map(|p| p.clr.clone())
            .ok_or_else(|| {
                CatalogError::invalid(format!("missing '{}' preset", DEFAULT_PRESET))
            })?;
        if default_clr.is_empty() {
            return Err(CatalogError::invalid(format!(
                "'{}' preset must set clr",
                DEFAULT_PRESET
            )));
        }
        for preset in &mut presets {
            if preset.clr.is_empty() {
                preset.clr = default_clr.clone();
            }
        }

        let catalog = Self {
            quantities,
            index,
            filters,
            presets,
        };
        for preset in &catalog.presets {
            catalog
                .check_projection(&preset.x, &preset.y, &preset.clr)
                .map_err(|e| CatalogError::invalid(format!("preset '{}': {}", preset.name, e)))?;
        }
        Ok(catalog)
    }

    pub fn quantity(&self, name: &str) -> Option<&Quantity> {
        self.index.get(name).map(|&i| &self.quantities[i])
    }

    pub fn quantities(&self) -> &[Quantity] {
        &self.quantities
    }

    /// Names of quantities exposed as filters, in display order
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Float quantities usable as plot axes, in catalog order
    pub fn plot_quantities(&self) -> impl Iterator<Item = &Quantity> {
        self.quantities.iter().filter(|q| q.is_float())
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn default_preset(&self) -> &Preset {
        // Presence checked in `new`
        self.preset(DEFAULT_PRESET)
            .unwrap_or_else(|| &self.presets[0])
    }

    /// Check that x/y are float quantities and the colour is either the
    /// categorical `group` quantity or a float quantity
    pub fn check_projection(&self, x: &str, y: &str, clr: &str) -> Result<(), String> {
        for (axis, name) in [("x", x), ("y", y)] {
            match self.quantity(name) {
                Some(q) if q.is_float() => {}
                Some(_) => return Err(format!("{} axis '{}' is not a float quantity", axis, name)),
                None => return Err(format!("unknown quantity '{}'", name)),
            }
        }
        match self.quantity(clr) {
            Some(q) if clr == GROUP_COLOR && !q.is_float() => Ok(()),
            Some(q) if q.is_float() => Ok(()),
            Some(_) => Err(format!(
                "colour '{}' must be '{}' or a float quantity",
                clr, GROUP_COLOR
            )),
            None => Err(format!("unknown quantity '{}'", clr)),
        }
    }
}

fn validate_quantity(quantity: &Quantity) -> Result<(), CatalogError> {
    if quantity.name.trim().is_empty() {
        return Err(CatalogError::invalid("quantity with empty column name"));
    }
    match &quantity.kind {
        QuantityKind::Float { min, max } => {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(CatalogError::invalid(format!(
                    "quantity '{}' has invalid range [{}, {}]",
                    quantity.name, min, max
                )));
            }
        }
        QuantityKind::Categorical { labels } => {
            if labels.is_empty() {
                return Err(CatalogError::invalid(format!(
                    "categorical quantity '{}' has no labels",
                    quantity.name
                )));
            }
            let mut seen = HashSet::new();
            for l in labels {
                if !seen.insert(l.label.as_str()) {
                    return Err(CatalogError::invalid(format!(
                        "categorical quantity '{}' repeats label '{}'",
                        quantity.name, l.label
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Small catalog shared by tests across modules
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::*;

    pub fn preset(name: &str, x: &str, y: &str, clr: &str) -> Preset {
        Preset {
            name: name.to_string(),
            x: x.to_string(),
            y: y.to_string(),
            clr: clr.to_string(),
            filters: BTreeMap::new(),
        }
    }

    pub fn catalog() -> Arc<Catalog> {
        let quantities = vec![
            Quantity::categorical("group", &["COFs", "MOFs", "zeolites", "sampled"]),
            Quantity::float("pore_diameter", 2.0, 20.0),
            Quantity::float("void_fraction", 0.0, 1.0),
            Quantity::float("surface_area", 0.0, 8000.0),
            Quantity::float("density", 0.0, 5.0),
            Quantity::float("henry_coefficient", 0.0, 0.001),
            Quantity::float("deliverable_capacity", 0.0, 300.0),
        ];
        let filters = ["group", "pore_diameter", "void_fraction", "surface_area"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let presets = vec![
            preset("default", "pore_diameter", "deliverable_capacity", "group"),
            preset("henry", "void_fraction", "henry_coefficient", ""),
            preset("surface", "surface_area", "deliverable_capacity", "density"),
        ];
        Arc::new(Catalog::new(quantities, filters, presets).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{catalog, preset};
    use super::*;

    #[test]
    fn test_lookup_and_order() {
        let catalog = catalog();

        assert!(catalog.quantity("pore_diameter").unwrap().is_float());
        assert!(catalog.quantity("missing").is_none());
        assert_eq!(catalog.filters()[0], "group");
        let axes: Vec<_> = catalog.plot_quantities().map(|q| q.name.as_str()).collect();
        assert_eq!(axes[0], "pore_diameter");
        assert!(!axes.contains(&"group"));
    }

    #[test]
    fn test_preset_inherits_default_clr() {
        let catalog = catalog();
        assert_eq!(catalog.preset("henry").unwrap().clr, "group");
        assert_eq!(catalog.preset("surface").unwrap().clr, "density");
        assert_eq!(catalog.default_preset().name, "default");
    }

    #[test]
    fn test_rejects_duplicate_quantity() {
        let err = Catalog::new(
            vec![Quantity::float("a", 0.0, 1.0), Quantity::float("a", 0.0, 2.0)],
            vec![],
            vec![preset("default", "a", "a", "a")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate quantity 'a'"));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = Catalog::new(
            vec![Quantity::float("a", 2.0, 1.0)],
            vec![],
            vec![preset("default", "a", "a", "a")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid range"));
    }

    #[test]
    fn test_rejects_empty_labels() {
        let err = Catalog::new(
            vec![Quantity::float("a", 0.0, 1.0), Quantity::categorical("group", &[])],
            vec![],
            vec![preset("default", "a", "a", "group")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("has no labels"));
    }

    #[test]
    fn test_rejects_unknown_filter() {
        let err = Catalog::new(
            vec![Quantity::float("a", 0.0, 1.0)],
            vec!["b".to_string()],
            vec![preset("default", "a", "a", "a")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("filter 'b' is not a known quantity"));
    }

    #[test]
    fn test_requires_default_preset() {
        let err = Catalog::new(
            vec![Quantity::float("a", 0.0, 1.0)],
            vec![],
            vec![preset("other", "a", "a", "a")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing 'default' preset"));
    }

    #[test]
    fn test_rejects_categorical_axis() {
        let err = Catalog::new(
            vec![
                Quantity::float("a", 0.0, 1.0),
                Quantity::categorical("group", &["MOFs"]),
            ],
            vec![],
            vec![preset("default", "group", "a", "group")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("x axis 'group' is not a float quantity"));
    }

    #[test]
    fn test_check_projection_colour_rules() {
        let catalog = catalog();
        assert!(catalog.check_projection("pore_diameter", "void_fraction", "group").is_ok());
        assert!(catalog.check_projection("pore_diameter", "void_fraction", "density").is_ok());
        assert!(catalog.check_projection("pore_diameter", "void_fraction", "nope").is_err());
        assert!(catalog.check_projection("nope", "void_fraction", "group").is_err());
    }

    #[test]
    fn test_display_label() {
        let mut q = Quantity::float("pore_diameter", 2.0, 20.0);
        q.label = "Pore diameter".into();
        assert_eq!(q.display_label(), "Pore diameter");
        q.unit = "A".into();
        assert_eq!(q.display_label(), "Pore diameter [A]");
    }

    #[test]
    fn test_serialize_quantity_kind() {
        let json = serde_json::to_value(Quantity::float("density", 0.0, 5.0)).unwrap();
        assert_eq!(json["type"], "float");
        assert_eq!(json["max"], 5.0);

        let json = serde_json::to_value(Quantity::categorical("group", &["MOFs"])).unwrap();
        assert_eq!(json["type"], "categorical");
        assert_eq!(json["labels"][0]["label"], "MOFs");
    }
}
