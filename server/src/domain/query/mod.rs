//! Query execution
//!
//! Turns a filter state and a projection into one bounded store query and a
//! plot-ready result set with its status line.

mod executor;
mod projection;

pub use executor::{QueryExecutor, build_predicates};
pub use projection::Projection;

use serde::Serialize;

/// Colour channel of a plotted record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Color {
    /// Category label, drawn with a discrete palette
    Label(String),
    /// Continuous value, drawn with a colour scale
    Value(f64),
}

/// One plotted structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub name: String,
    pub reference: String,
}

/// Result of one query execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// At most `max_points` records in store order
    pub records: Vec<Record>,
    /// Unbounded number of matching structures
    pub total: u64,
    pub status: String,
}

impl QueryOutcome {
    pub fn is_truncated(&self) -> bool {
        self.total > self.records.len() as u64
    }
}

/// Status line for `total` matches plotted with a cap of `max_points`
pub fn status_text(total: u64, max_points: usize) -> String {
    if total == 0 {
        return "No matching structure found.".to_string();
    }
    let plotted = total.min(max_points as u64);
    format!("{} frameworks found.\nPlotting {}...", total, plotted)
}
