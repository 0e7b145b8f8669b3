//! Domain logic for the screening dashboard
//!
//! - `catalog` - Quantity catalog and plot presets
//! - `filter` - Per-session filter selections
//! - `query` - Query execution, truncation and status text
//! - `session` - Filter sessions with stale-result detection
//! - `detail` - Property table of a single structure

pub mod catalog;
pub mod detail;
pub mod error;
pub mod filter;
pub mod query;
pub mod sequence;
pub mod session;

pub use catalog::{Catalog, CatalogError, Preset, Quantity, QuantityKind, load_catalog};
pub use error::{QueryError, ValidationError};
pub use filter::{FilterState, Selection, SelectionSpec};
pub use query::{Color, Projection, QueryExecutor, QueryOutcome, Record};
pub use session::{Session, SessionError, SessionStore};
