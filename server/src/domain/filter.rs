//! Filter state
//!
//! The current selection for every filterable quantity. A quantity whose
//! selection equals its catalog default (full range, or every label) is not
//! filtered; any other selection is an active filter and becomes one
//! predicate of the next query.
//!
//! Mutations validate first and only then write, so a rejected call leaves
//! the state exactly as it was.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Preset, Quantity, QuantityKind};
use super::error::ValidationError;

/// Selection of a single quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    /// Closed interval `[lo, hi]`
    Float { lo: f64, hi: f64 },
    /// Selected labels in catalog order; empty matches nothing
    Categorical { selected: Vec<String> },
}

/// Requested selection as sent by clients and stored in presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSpec {
    Range([f64; 2]),
    Labels(Vec<String>),
}

impl Selection {
    /// Default (unfiltered) selection of a quantity
    pub fn full(quantity: &Quantity) -> Self {
        match &quantity.kind {
            QuantityKind::Float { min, max } => Self::Float { lo: *min, hi: *max },
            QuantityKind::Categorical { labels } => Self::Categorical {
                selected: labels.iter().map(|l| l.label.clone()).collect(),
            },
        }
    }
}

/// Per-session filter selections backed by the shared catalog
#[derive(Debug, Clone)]
pub struct FilterState {
    catalog: Arc<Catalog>,
    // Only non-default selections are stored
    selections: BTreeMap<String, Selection>,
}

impl FilterState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            selections: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    fn quantity(&self, name: &str) -> Result<&Quantity, ValidationError> {
        self.catalog
            .quantity(name)
            .ok_or_else(|| ValidationError::UnknownQuantity(name.to_string()))
    }

    /// Restrict a float quantity to the closed interval `[lo, hi]`
    pub fn set_range(&mut self, quantity: &str, lo: f64, hi: f64) -> Result<(), ValidationError> {
        let selection = self.validate_range(quantity, lo, hi)?;
        self.store(quantity, selection);
        Ok(())
    }

    fn validate_range(&self, name: &str, lo: f64, hi: f64) -> Result<Selection, ValidationError> {
        let quantity = self.quantity(name)?;
        let (min, max) = quantity
            .range()
            .ok_or_else(|| ValidationError::NotFloat(name.to_string()))?;

        if !lo.is_finite() || !hi.is_finite() {
            return Err(ValidationError::NonFinite {
                quantity: name.to_string(),
            });
        }
        if lo > hi {
            return Err(ValidationError::InvertedRange {
                quantity: name.to_string(),
                lo,
                hi,
            });
        }
        if lo < min || hi > max {
            return Err(ValidationError::OutOfRange {
                quantity: name.to_string(),
                lo,
                hi,
                min,
                max,
            });
        }
        Ok(Selection::Float { lo, hi })
    }

    /// Select a subset of a categorical quantity's labels.
    ///
    /// Duplicates collapse and the stored order follows the catalog. An empty
    /// subset is legal and matches nothing.
    pub fn set_categories<S: AsRef<str>>(
        &mut self,
        quantity: &str,
        labels: &[S],
    ) -> Result<(), ValidationError> {
        let selection = self.validate_categories(quantity, labels)?;
        self.store(quantity, selection);
        Ok(())
    }

    fn validate_categories<S: AsRef<str>>(
        &self,
        name: &str,
        labels: &[S],
    ) -> Result<Selection, ValidationError> {
        let quantity = self.quantity(name)?;
        let allowed: Vec<&str> = quantity
            .labels()
            .ok_or_else(|| ValidationError::NotCategorical(name.to_string()))?
            .collect();

        let requested: HashSet<&str> = labels.iter().map(|l| l.as_ref()).collect();
        let mut unknown: Vec<String> = requested
            .iter()
            .filter(|l| !allowed.contains(*l))
            .map(|l| l.to_string())
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ValidationError::UnknownLabels {
                quantity: name.to_string(),
                labels: unknown,
            });
        }

        let selected = allowed
            .into_iter()
            .filter(|l| requested.contains(l))
            .map(str::to_string)
            .collect();
        Ok(Selection::Categorical { selected })
    }

    /// Apply a client or preset selection to one quantity
    pub fn apply(&mut self, quantity: &str, spec: &SelectionSpec) -> Result<(), ValidationError> {
        match spec {
            SelectionSpec::Range([lo, hi]) => self.set_range(quantity, *lo, *hi),
            SelectionSpec::Labels(labels) => self.set_categories(quantity, labels),
        }
    }

    fn store(&mut self, name: &str, selection: Selection) {
        let is_default = self
            .catalog
            .quantity(name)
            .is_some_and(|q| Selection::full(q) == selection);
        if is_default {
            self.selections.remove(name);
        } else {
            self.selections.insert(name.to_string(), selection);
        }
    }

    /// Whether the quantity currently constrains queries
    pub fn is_active(&self, quantity: &str) -> bool {
        self.selections.contains_key(quantity)
    }

    /// Current selection, or `None` for a quantity absent from the catalog
    pub fn selection(&self, quantity: &str) -> Option<Selection> {
        match self.selections.get(quantity) {
            Some(selection) => Some(selection.clone()),
            None => self.catalog.quantity(quantity).map(Selection::full),
        }
    }

    /// Active filters in quantity name order
    pub fn active(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.selections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Restore a quantity to its default selection
    pub fn reset(&mut self, quantity: &str) -> Result<(), ValidationError> {
        self.quantity(quantity)?;
        self.selections.remove(quantity);
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.selections.clear();
    }

    /// Replace every selection with the preset's stored filters.
    ///
    /// All filters are validated before anything is written.
    pub fn apply_preset(&mut self, preset: &Preset) -> Result<(), ValidationError> {
        let mut next = Self::new(self.catalog.clone());
        for (quantity, spec) in &preset.filters {
            next.apply(quantity, spec)?;
        }
        self.selections = next.selections;
        Ok(())
    }
}
