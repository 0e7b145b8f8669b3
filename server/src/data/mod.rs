//! Data storage layer
//!
//! Read-only access to the simulation results:
//! - `sqlite` - SQLite structure store (the only backend)
//! - `filters` - Predicates and SQL generation
//! - `traits` - The `StructureStore` seam the query layer talks to
//! - `error` - Unified error type for store failures

pub mod error;
pub mod filters;
pub mod sqlite;
pub mod traits;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::{
    PropertyValue, StorePage, StoreQuery, StoreRow, StoreValue, StructureStore,
};
