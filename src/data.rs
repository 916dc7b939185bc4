//! Tabular data model: named columns of numeric or categorical samples
//!
//! A [`Column`] holds one feature's values drawn from either the reference
//! or production dataset. Numeric columns use NaN for missing values,
//! categorical columns use `None`. A [`Dataset`] is an ordered collection
//! of equal-length named columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, Result};

/// Data kind of a column, resolved once at engine construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// One column of scalar values, immutable once captured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Column {
    /// Numeric values; NaN marks a missing entry
    Numeric(Vec<f64>),
    /// Categorical values; `None` marks a missing entry
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Build a categorical column from string labels (no missing entries)
    pub fn from_labels<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Column::Categorical(labels.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Numeric values with missing entries (NaN) removed
    ///
    /// Fails when called on a categorical column: numeric detectors are
    /// only ever paired with numeric columns by the registry.
    pub fn numeric_values(&self) -> Result<Vec<f64>> {
        match self {
            Column::Numeric(v) => Ok(v.iter().copied().filter(|x| !x.is_nan()).collect()),
            Column::Categorical(_) => Err(DriftError::DataError(
                "expected a numeric column, got a categorical column".to_string(),
            )),
        }
    }

    /// Category frequencies, excluding missing entries
    ///
    /// Numeric columns are counted by their display representation so
    /// categorical detectors remain usable on low-cardinality numerics.
    pub fn value_counts(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        match self {
            Column::Numeric(v) => {
                for x in v.iter().filter(|x| !x.is_nan()) {
                    *counts.entry(format!("{x}")).or_insert(0) += 1;
                }
            }
            Column::Categorical(v) => {
                for label in v.iter().flatten() {
                    *counts.entry(label.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

/// Ordered collection of named, equal-length columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<(String, Column)>,
    n_rows: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from (name, column) pairs
    ///
    /// All columns must have the same length.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Column)>,
    ) -> Result<Self> {
        let mut ds = Self::new();
        for (name, column) in columns {
            ds.insert(name, column)?;
        }
        Ok(ds)
    }

    /// Add a column; its length must match existing columns
    pub fn insert<S: Into<String>>(&mut self, name: S, column: Column) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(DriftError::DataError(format!(
                "column '{}' has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows
            )));
        }
        self.n_rows = column.len();
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = column;
        } else {
            self.columns.push((name, column));
        }
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }
}
