use std::sync::Arc;

use super::{Color, Projection, QueryOutcome, Record, status_text};
use crate::core::constants::{DEFAULT_MAX_POINTS, DEFAULT_NAME_COLUMN, DEFAULT_REFERENCE_COLUMN};
use crate::data::filters::Predicate;
use crate::data::{StoreQuery, StoreRow, StoreValue, StructureStore};
use crate::domain::catalog::{Catalog, Preset, QuantityKind};
use crate::domain::error::QueryError;
use crate::domain::filter::{FilterState, Selection};

/// One predicate per active filter, in filter name order
pub fn build_predicates(
    filters: &FilterState,
    catalog: &Catalog,
) -> Result<Vec<Predicate>, QueryError> {
    filters
        .active()
        .map(|(name, selection)| {
            let quantity = catalog.quantity(name).ok_or_else(|| {
                QueryError::configuration(format!("filter on unknown quantity '{}'", name))
            })?;
            match (selection, &quantity.kind) {
                (Selection::Float { lo, hi }, QuantityKind::Float { .. }) => {
                    Ok(Predicate::between(name, *lo, *hi))
                }
                (Selection::Categorical { selected }, QuantityKind::Categorical { .. }) => {
                    Ok(Predicate::any_of(name, selected.clone()))
                }
                _ => Err(QueryError::configuration(format!(
                    "filter on '{}' does not match its quantity type",
                    name
                ))),
            }
        })
        .collect()
}

/// Runs filtered structure queries against a store
pub struct QueryExecutor {
    store: Arc<dyn StructureStore>,
    catalog: Arc<Catalog>,
    max_points: usize,
    name_column: String,
    reference_column: String,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn StructureStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            catalog,
            max_points: DEFAULT_MAX_POINTS,
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            reference_column: DEFAULT_REFERENCE_COLUMN.to_string(),
        }
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Columns read into each record's name and reference
    pub fn with_identity_columns(mut self, name: &str, reference: &str) -> Self {
        self.name_column = name.to_string();
        self.reference_column = reference.to_string();
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn StructureStore> {
        &self.store
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Projection plotting `x` against `y` coloured by `color`
    pub fn projection(&self, x: &str, y: &str, color: &str) -> Projection {
        Projection {
            x: x.to_string(),
            y: y.to_string(),
            color: color.to_string(),
            name: self.name_column.clone(),
            reference: self.reference_column.clone(),
        }
    }

    pub fn preset_projection(&self, preset: &Preset) -> Projection {
        Projection::from_preset(preset, &self.name_column, &self.reference_column)
    }

    /// Run exactly one store query for the filters and shape the result.
    ///
    /// Store failures are not retried. A value that cannot be read as a
    /// number in a numeric channel fails the whole query.
    pub async fn execute(
        &self,
        projection: &Projection,
        filters: &FilterState,
    ) -> Result<QueryOutcome, QueryError> {
        projection.validate(&self.catalog)?;
        let predicates = build_predicates(filters, &self.catalog)?;
        let predicate_count = predicates.len();

        let query = StoreQuery {
            columns: projection.columns(),
            predicates,
            limit: self.max_points,
        };
        let page = self.store.query(&query).await.map_err(|e| {
            tracing::warn!(
                backend = self.store.backend_name(),
                error = %e,
                "Structure query failed"
            );
            QueryError::from(e)
        })?;

        let categorical = projection.has_categorical_color();
        let records = page
            .rows
            .into_iter()
            .take(self.max_points)
            .enumerate()
            .map(|(index, row)| shape_record(projection, categorical, index, row))
            .collect::<Result<Vec<_>, _>>()?;

        let total = page.total.max(records.len() as u64);
        if total > records.len() as u64 {
            tracing::info!(
                total,
                plotted = records.len(),
                "Result truncated to max_points"
            );
        }
        tracing::debug!(
            x = %projection.x,
            y = %projection.y,
            color = %projection.color,
            predicates = predicate_count,
            total,
            "Query executed"
        );

        Ok(QueryOutcome {
            records,
            total,
            status: status_text(total, self.max_points),
        })
    }
}

fn shape_record(
    projection: &Projection,
    categorical: bool,
    index: usize,
    row: StoreRow,
) -> Result<Record, QueryError> {
    let mut cells = row.into_iter();
    let mut next = || cells.next().unwrap_or(StoreValue::Null);
    let (x, y, color, name, reference) = (next(), next(), next(), next(), next());

    let color = if categorical {
        Color::Label(label(&projection.color, index, color)?)
    } else {
        Color::Value(numeric(&projection.color, index, color)?)
    };
    Ok(Record {
        x: numeric(&projection.x, index, x)?,
        y: numeric(&projection.y, index, y)?,
        color,
        name: label(&projection.name, index, name)?,
        reference: label(&projection.reference, index, reference)?,
    })
}

fn numeric(column: &str, row: usize, value: StoreValue) -> Result<f64, QueryError> {
    value
        .as_f64()
        .ok_or_else(|| integrity_error(column, row, &value))
}

fn label(column: &str, row: usize, value: StoreValue) -> Result<String, QueryError> {
    if value.is_null() {
        return Err(integrity_error(column, row, &value));
    }
    Ok(value.into_label().unwrap_or_default())
}

fn integrity_error(column: &str, row: usize, value: &StoreValue) -> QueryError {
    tracing::warn!(column, row, value = %value, "Unreadable value in result row");
    QueryError::DataIntegrity {
        column: column.to_string(),
        row,
        value: value.to_string(),
    }
}
