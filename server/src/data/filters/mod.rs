//! Query predicate system
//!
//! Provides the predicate types produced from active filters and the SQL
//! generation used by the structure store. Predicates support closed-interval
//! range tests on float columns and set membership on categorical columns.
//!
//! ## Usage
//!
//! ```
//! use poremap_server::data::filters::{Predicate, SqlParams, build_where_clause};
//!
//! let predicates = vec![Predicate::between("pore_diameter", 5.0, 10.0)];
//! let mut params = SqlParams::default();
//! let clause = build_where_clause(&predicates, &mut params);
//! assert_eq!(clause, " WHERE \"pore_diameter\" BETWEEN ? AND ?");
//! ```

mod builder;
mod types;

pub use builder::{build_properties_select, build_select, build_where_clause};
pub use types::{Predicate, SqlParams, SqlValue};
