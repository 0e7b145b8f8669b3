//! Structure detail table
//!
//! Shapes the full row of one structure into a property table for the
//! detail view. A `<prop>_units` column is folded into the label of
//! `<prop>` as `<prop> [unit]`.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::{DataError, PropertyValue, StoreValue, StructureStore};

const ID_COLUMN: &str = "id";
const UNITS_SUFFIX: &str = "_units";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRow {
    pub property: String,
    pub value: String,
}

/// Build the sorted property table of one structure row
pub fn property_table(properties: Vec<PropertyValue>) -> Vec<PropertyRow> {
    let mut units: HashMap<String, StoreValue> = HashMap::new();
    let mut values = Vec::with_capacity(properties.len());
    for property in properties {
        if property.column == ID_COLUMN {
            continue;
        }
        match property.column.strip_suffix(UNITS_SUFFIX) {
            Some(base) if !base.is_empty() => {
                units.insert(base.to_string(), property.value);
            }
            _ => values.push(property),
        }
    }

    let mut rows: Vec<PropertyRow> = values
        .into_iter()
        .map(|p| {
            let property = match units.get(&p.column) {
                Some(unit) if !unit.is_null() => format!("{} [{}]", p.column, unit),
                _ => p.column,
            };
            let value = if p.value.is_null() {
                String::new()
            } else {
                p.value.to_string()
            };
            PropertyRow { property, value }
        })
        .collect();
    rows.sort_by(|a, b| a.property.cmp(&b.property));
    rows
}

/// Look up a structure by display name; `None` when it does not exist
pub async fn structure_properties(
    store: &dyn StructureStore,
    name: &str,
) -> Result<Option<Vec<PropertyRow>>, DataError> {
    let properties = store.fetch_properties(name).await?;
    if properties.is_none() {
        tracing::debug!(name, "Structure not found");
    }
    Ok(properties.map(property_table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::testing;

    fn prop(column: &str, value: StoreValue) -> PropertyValue {
        PropertyValue {
            column: column.to_string(),
            value,
        }
    }

    #[test]
    fn test_units_fold_into_label() {
        let rows = property_table(vec![
            prop("id", StoreValue::Integer(7)),
            prop("name", StoreValue::Text("ZIF-8".into())),
            prop("pore_diameter", StoreValue::Real(11.4)),
            prop("pore_diameter_units", StoreValue::Text("A".into())),
            prop("density", StoreValue::Real(0.95)),
        ]);

        assert_eq!(
            rows,
            vec![
                PropertyRow {
                    property: "density".into(),
                    value: "0.95".into()
                },
                PropertyRow {
                    property: "name".into(),
                    value: "ZIF-8".into()
                },
                PropertyRow {
                    property: "pore_diameter [A]".into(),
                    value: "11.4".into()
                },
            ]
        );
    }

    #[test]
    fn test_null_unit_and_orphan_units() {
        let rows = property_table(vec![
            prop("density", StoreValue::Null),
            prop("density_units", StoreValue::Null),
            prop("volume_units", StoreValue::Text("A^3".into())),
        ]);

        assert_eq!(
            rows,
            vec![PropertyRow {
                property: "density".into(),
                value: String::new()
            }]
        );
    }

    #[tokio::test]
    async fn test_structure_properties_from_sqlite() {
        let service = testing::service(&testing::sample_seeds()).await;

        let rows = structure_properties(&service, "MFI").await.unwrap().unwrap();
        assert!(rows.iter().all(|r| r.property != "id"));
        assert!(rows.windows(2).all(|w| w[0].property <= w[1].property));
        let diameter = rows
            .iter()
            .find(|r| r.property == "pore_diameter [A]")
            .unwrap();
        assert_eq!(diameter.value, "6.4");

        assert!(structure_properties(&service, "nope").await.unwrap().is_none());
    }
}
