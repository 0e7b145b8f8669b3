use crate::core::constants::GROUP_COLOR;
use crate::domain::catalog::{Catalog, Preset};
use crate::domain::error::QueryError;

/// Columns bound to the plot axes, colour, and record identity
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub x: String,
    pub y: String,
    pub color: String,
    pub name: String,
    pub reference: String,
}

impl Projection {
    /// Projection of a plot preset
    pub fn from_preset(preset: &Preset, name: &str, reference: &str) -> Self {
        Self {
            x: preset.x.clone(),
            y: preset.y.clone(),
            color: preset.clr.clone(),
            name: name.to_string(),
            reference: reference.to_string(),
        }
    }

    /// Check the plotted quantities against the catalog
    pub fn validate(&self, catalog: &Catalog) -> Result<(), QueryError> {
        catalog
            .check_projection(&self.x, &self.y, &self.color)
            .map_err(QueryError::Configuration)
    }

    /// Colour is read as labels rather than a continuous value
    pub fn has_categorical_color(&self) -> bool {
        self.color == GROUP_COLOR
    }

    /// Selected columns in record field order
    pub(crate) fn columns(&self) -> Vec<String> {
        vec![
            self.x.clone(),
            self.y.clone(),
            self.color.clone(),
            self.name.clone(),
            self.reference.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::testing::{catalog, preset};

    #[test]
    fn test_from_preset() {
        let projection = Projection::from_preset(
            &preset("surface", "surface_area", "deliverable_capacity", "density"),
            "name",
            "filename",
        );
        assert_eq!(
            projection.columns(),
            vec!["surface_area", "deliverable_capacity", "density", "name", "filename"]
        );
        assert!(!projection.has_categorical_color());
        assert!(projection.validate(&catalog()).is_ok());
    }

    #[test]
    fn test_validate_unknown_quantity() {
        let projection = Projection::from_preset(
            &preset("x", "pore_diameter", "nope", "group"),
            "name",
            "filename",
        );
        assert!(projection.has_categorical_color());
        assert!(matches!(
            projection.validate(&catalog()),
            Err(QueryError::Configuration(msg)) if msg.contains("nope")
        ));
    }
}
