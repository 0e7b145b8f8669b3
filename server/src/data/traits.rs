//! Store traits for structure backends
//!
//! The query layer talks to the backing data store only through
//! [`StructureStore`]. A store accepts a projection, a predicate list and a
//! row limit, and returns rows in an implementation-defined but stable order
//! together with the unbounded match count.

use std::fmt;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::filters::Predicate;

// ============================================================================
// Row Types
// ============================================================================

/// A single cell as returned by the store, before any coercion
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl StoreValue {
    /// Coerce to a float the way numeric columns are read.
    ///
    /// Integers and reals convert directly; text is parsed after trimming.
    /// Returns `None` for NULL, non-numeric text, and non-finite results.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Null => return None,
            Self::Integer(i) => *i as f64,
            Self::Real(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Render as a label (categorical values, names, references)
    pub fn into_label(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for StoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One store row, in projection order
pub type StoreRow = Vec<StoreValue>;

/// A named column value of a full structure row
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub column: String,
    pub value: StoreValue,
}

// ============================================================================
// Query Types
// ============================================================================

/// A bounded, projected, filtered structure query
#[derive(Debug, Clone)]
pub struct StoreQuery {
    /// Columns to select, in output order
    pub columns: Vec<String>,
    /// Predicates combined with AND; empty selects every row
    pub predicates: Vec<Predicate>,
    /// Maximum number of rows to materialize
    pub limit: usize,
}

/// Result page of a [`StoreQuery`]
#[derive(Debug, Clone, Default)]
pub struct StorePage {
    /// Unbounded number of matching rows
    pub total: u64,
    /// At most `limit` rows in store order
    pub rows: Vec<StoreRow>,
}

// ============================================================================
// Structure Store Trait
// ============================================================================

/// Read-only access to the structures table
#[async_trait]
pub trait StructureStore: Send + Sync {
    /// Short backend identifier used in logs and errors
    fn backend_name(&self) -> &'static str;

    /// Run one projected, filtered, limited query
    async fn query(&self, query: &StoreQuery) -> Result<StorePage, DataError>;

    /// Fetch every column of the structure with the given display name
    async fn fetch_properties(&self, name: &str)
    -> Result<Option<Vec<PropertyValue>>, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64_numeric_variants() {
        assert_eq!(StoreValue::Integer(7).as_f64(), Some(7.0));
        assert_eq!(StoreValue::Real(0.25).as_f64(), Some(0.25));
        assert_eq!(StoreValue::Text(" 3.5 ".into()).as_f64(), Some(3.5));
    }

    #[test]
    fn test_as_f64_rejects_non_numeric() {
        assert_eq!(StoreValue::Null.as_f64(), None);
        assert_eq!(StoreValue::Text("n/a".into()).as_f64(), None);
        assert_eq!(StoreValue::Text("NaN".into()).as_f64(), None);
        assert_eq!(StoreValue::Real(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn test_into_label() {
        assert_eq!(StoreValue::Text("MOFs".into()).into_label(), Some("MOFs".into()));
        assert_eq!(StoreValue::Integer(3).into_label(), Some("3".into()));
        assert_eq!(StoreValue::Null.into_label(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(StoreValue::Null.to_string(), "NULL");
        assert_eq!(StoreValue::Real(1.5).to_string(), "1.5");
        assert_eq!(StoreValue::Text("TSC".into()).to_string(), "TSC");
    }
}
