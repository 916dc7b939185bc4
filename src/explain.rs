//! Statistical explanation of numeric distribution shifts
//!
//! Drift detectors answer "did this feature drift"; the explanations
//! here answer "how". For a numeric column they compare central
//! tendency, spread, range, and quantiles between the reference and
//! production samples.

use serde::{Deserialize, Serialize};

use crate::data::{Column, ColumnKind, Dataset};
use crate::error::{DriftError, Result};
use crate::stats::{mean, quantile_sorted, std_dev};

/// Default quantiles compared by [`explain_feature`]
pub const DEFAULT_QUANTILES: [f64; 3] = [0.25, 0.5, 0.75];

/// Summary statistics of one numeric sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    /// Non-missing observations
    pub count: usize,
    /// Fraction of rows that were missing
    pub missing_rate: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Values at the requested quantiles, in request order
    pub quantiles: Vec<f64>,
}

impl FeatureSnapshot {
    fn from_column(column: &Column, quantiles: &[f64]) -> Result<Self> {
        let values = column.numeric_values()?;
        if values.is_empty() {
            return Err(DriftError::EmptySample(
                "cannot summarize a column with no non-missing values".to_string(),
            ));
        }
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            count: values.len(),
            missing_rate: 1.0 - values.len() as f64 / column.len() as f64,
            mean: mean(&values),
            std: std_dev(&values),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            quantiles: quantiles.iter().map(|&q| quantile_sorted(&sorted, q)).collect(),
        })
    }
}

/// Shift at a single quantile between reference and production
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantileShift {
    pub quantile: f64,
    pub reference_value: f64,
    pub production_value: f64,
    pub absolute_diff: f64,
    /// Percent change over the reference value; +/- infinity when the
    /// reference value is 0 and the production value is not
    pub relative_diff_percent: f64,
}

/// How a numeric feature's distribution moved between two periods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExplanation {
    pub feature_name: String,
    pub reference: FeatureSnapshot,
    pub production: FeatureSnapshot,
    pub mean_shift: f64,
    pub mean_shift_percent: f64,
    pub std_change: f64,
    pub std_change_percent: f64,
    pub quantile_shifts: Vec<QuantileShift>,
}

fn percent_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        if new == 0.0 {
            0.0
        } else if new > 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    } else {
        (new - old) / old.abs() * 100.0
    }
}

/// Explain one numeric feature's shift at the default quantiles
pub fn explain_feature(
    name: &str,
    reference: &Column,
    production: &Column,
) -> Result<FeatureExplanation> {
    explain_feature_at(name, reference, production, &DEFAULT_QUANTILES)
}

/// Explain one numeric feature's shift at caller-chosen quantiles
pub fn explain_feature_at(
    name: &str,
    reference: &Column,
    production: &Column,
    quantiles: &[f64],
) -> Result<FeatureExplanation> {
    let ref_snapshot = FeatureSnapshot::from_column(reference, quantiles)?;
    let prod_snapshot = FeatureSnapshot::from_column(production, quantiles)?;

    let quantile_shifts = quantiles
        .iter()
        .enumerate()
        .map(|(i, &q)| {
            let ref_val = ref_snapshot.quantiles[i];
            let prod_val = prod_snapshot.quantiles[i];
            QuantileShift {
                quantile: q,
                reference_value: ref_val,
                production_value: prod_val,
                absolute_diff: prod_val - ref_val,
                relative_diff_percent: percent_change(ref_val, prod_val),
            }
        })
        .collect();

    Ok(FeatureExplanation {
        feature_name: name.to_string(),
        mean_shift: prod_snapshot.mean - ref_snapshot.mean,
        mean_shift_percent: percent_change(ref_snapshot.mean, prod_snapshot.mean),
        std_change: prod_snapshot.std - ref_snapshot.std,
        std_change_percent: percent_change(ref_snapshot.std, prod_snapshot.std),
        quantile_shifts,
        reference: ref_snapshot,
        production: prod_snapshot,
    })
}

/// Explain every numeric column present in both datasets
///
/// Columns missing from either side, categorical columns, and columns
/// with no non-missing values on either side are skipped. Order follows
/// the reference dataset.
pub fn explain_dataset(reference: &Dataset, production: &Dataset) -> Vec<FeatureExplanation> {
    reference
        .iter()
        .filter(|(_, column)| column.kind() == ColumnKind::Numeric)
        .filter_map(|(name, ref_column)| {
            let prod_column = production.column(name)?;
            explain_feature(name, ref_column, prod_column).ok()
        })
        .collect()
}
