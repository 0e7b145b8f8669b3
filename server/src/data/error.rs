//! Unified error type for data layer
//!
//! Errors raised by structure store backends. The query layer maps every
//! variant onto its connectivity class; none of them are retried here.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error (connection, statement or decode failure)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Database file missing or unusable
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// Query names a column the structures table does not have
    #[error("Unknown column '{column}' in {backend} table '{table}'")]
    UnknownColumn {
        backend: &'static str,
        table: String,
        column: String,
    },

    /// Store returned a row shape the query did not ask for
    #[error("Unexpected result shape from {backend}: {reason}")]
    UnexpectedShape {
        backend: &'static str,
        reason: String,
    },
}

impl DataError {
    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(
        backend: &'static str,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self::UnknownColumn {
            backend,
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create an unexpected shape error
    pub fn unexpected_shape(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            backend,
            reason: reason.into(),
        }
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            Self::BackendUnavailable { .. } => true,
            Self::UnknownColumn { .. } | Self::UnexpectedShape { .. } => false,
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::BackendUnavailable { backend, .. } => backend,
            Self::UnknownColumn { backend, .. } => backend,
            Self::UnexpectedShape { backend, .. } => backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_unavailable_error_display() {
        let err = DataError::backend_unavailable("sqlite", "file not found: structures.db");
        assert_eq!(
            err.to_string(),
            "Backend sqlite is not available: file not found: structures.db"
        );
    }

    #[test]
    fn test_unexpected_shape_display() {
        let err = DataError::unexpected_shape("sqlite", "expected 6 columns, got 2");
        assert_eq!(
            err.to_string(),
            "Unexpected result shape from sqlite: expected 6 columns, got 2"
        );
    }

    #[test]
    fn test_unknown_column_display() {
        let err = DataError::unknown_column("sqlite", "structures", "grp");
        assert_eq!(
            err.to_string(),
            "Unknown column 'grp' in sqlite table 'structures'"
        );
        assert!(!err.is_transient());
    }

    #[test]
    fn test_backend_method() {
        assert_eq!(DataError::Sqlite(sqlx::Error::PoolClosed).backend(), "sqlite");
        assert_eq!(
            DataError::backend_unavailable("sqlite", "gone").backend(),
            "sqlite"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(DataError::Sqlite(sqlx::Error::PoolTimedOut).is_transient());
        assert!(DataError::backend_unavailable("sqlite", "gone").is_transient());
        assert!(!DataError::unexpected_shape("sqlite", "bad").is_transient());
        assert!(!DataError::Sqlite(sqlx::Error::RowNotFound).is_transient());
    }
}
