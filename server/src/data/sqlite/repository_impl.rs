//! StructureStore trait implementation for SQLite

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use super::{BACKEND, SqliteService};
use crate::data::error::DataError;
use crate::data::filters::{
    Predicate, SqlParams, SqlValue, build_properties_select, build_select,
};
use crate::data::traits::{PropertyValue, StoreQuery, StorePage, StoreValue, StructureStore};

#[async_trait]
impl StructureStore for SqliteService {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn query(&self, query: &StoreQuery) -> Result<StorePage, DataError> {
        // SQLite reads an unresolved double-quoted identifier as a string
        // literal, so unknown columns must be rejected before building SQL
        let referenced = query
            .columns
            .iter()
            .map(String::as_str)
            .chain(query.predicates.iter().map(Predicate::column));
        if let Some(column) = self.missing_columns(referenced).first() {
            return Err(DataError::unknown_column(BACKEND, &self.table, *column));
        }

        let mut params = SqlParams::default();
        let sql = build_select(
            &self.table,
            &query.columns,
            &query.predicates,
            query.limit,
            &mut params,
        );
        tracing::trace!(sql = %sql, params = params.values.len(), "Structure query");

        let mut statement = sqlx::query(&sql);
        for value in params.values {
            statement = match value {
                SqlValue::Integer(i) => statement.bind(i),
                SqlValue::Real(f) => statement.bind(f),
                SqlValue::Text(s) => statement.bind(s),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;

        let width = query.columns.len();
        let mut total = 0u64;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != width + 1 {
                return Err(DataError::unexpected_shape(
                    BACKEND,
                    format!("expected {} columns, got {}", width + 1, row.len()),
                ));
            }
            let values = (0..width)
                .map(|i| decode_value(row, i))
                .collect::<Result<Vec<_>, _>>()?;
            total = match decode_value(row, width)? {
                StoreValue::Integer(n) => n.max(0) as u64,
                other => {
                    return Err(DataError::unexpected_shape(
                        BACKEND,
                        format!("match count is not an integer: {}", other),
                    ));
                }
            };
            out.push(values);
        }

        Ok(StorePage { total, rows: out })
    }

    async fn fetch_properties(
        &self,
        name: &str,
    ) -> Result<Option<Vec<PropertyValue>>, DataError> {
        let sql = build_properties_select(&self.table, &self.name_column);
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let properties = row
            .columns()
            .iter()
            .map(|column| {
                Ok(PropertyValue {
                    column: column.name().to_string(),
                    value: decode_value(&row, column.ordinal())?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Some(properties))
    }
}

/// Decode one cell by its dynamic SQLite storage class
fn decode_value(row: &SqliteRow, index: usize) -> Result<StoreValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(StoreValue::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => StoreValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => StoreValue::Real(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            StoreValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => StoreValue::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
