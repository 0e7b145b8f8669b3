//! Predicate type definitions
//!
//! Defines the predicates combined (with AND) into a structure query.

use crate::utils::sql::{placeholders, quote_identifier};

/// A single filter predicate on one column
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Closed interval `lo <= column <= hi`
    Between { column: String, lo: f64, hi: f64 },
    /// Set membership; an empty set matches nothing
    AnyOf { column: String, values: Vec<String> },
}

/// Bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl Predicate {
    pub fn between(column: impl Into<String>, lo: f64, hi: f64) -> Self {
        Self::Between {
            column: column.into(),
            lo,
            hi,
        }
    }

    pub fn any_of(column: impl Into<String>, values: Vec<String>) -> Self {
        Self::AnyOf {
            column: column.into(),
            values,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Self::Between { column, .. } => column,
            Self::AnyOf { column, .. } => column,
        }
    }

    /// Generate SQL WHERE clause fragment
    /// Returns the SQL clause with ? placeholders and updates params
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        match self {
            Self::Between { column, lo, hi } => {
                params.values.push(SqlValue::Real(*lo));
                params.values.push(SqlValue::Real(*hi));
                format!("{} BETWEEN ? AND ?", quote_identifier(column))
            }
            Self::AnyOf { column, values } => {
                // `IN ()` is not valid SQL
                if values.is_empty() {
                    return "1 = 0".to_string();
                }
                params
                    .values
                    .extend(values.iter().cloned().map(SqlValue::Text));
                format!(
                    "{} IN ({})",
                    quote_identifier(column),
                    placeholders(values.len())
                )
            }
        }
    }
}
