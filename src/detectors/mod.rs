//! Drift detectors
//!
//! Each detector compares a reference sample against a production sample
//! and reports whether the distribution has shifted. Numerical detectors
//! operate on missing-value-filtered values; categorical detectors operate
//! on category frequencies.

mod categorical;
mod numerical;
mod registry;

pub use categorical::{ChiSquaredDetector, FrequencyPsiDetector};
pub use numerical::{
    AndersonDarlingDetector, CramerVonMisesDetector, JensenShannonDetector, KsDetector,
    PsiDetector, WassersteinDetector,
};
pub use registry::{detector_by_name, detector_for_kind, DETECTOR_NAMES};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::Column;
use crate::error::{DriftError, Result};

/// Result from a single drift detection test
///
/// `has_drift` is fully determined by the owning test's comparison
/// direction: p-value tests flag drift iff `p_value < threshold`,
/// distance and divergence tests iff `score >= threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Whether drift was detected
    pub has_drift: bool,
    /// Test statistic or distance score
    pub score: f64,
    /// Identifier of the test that produced this result
    pub method: String,
    /// Threshold used for the drift decision
    pub threshold: f64,
    /// Significance value, for tests that produce one
    pub p_value: Option<f64>,
}

/// Trait for drift detectors
///
/// Implementations are stateless apart from their configuration and are
/// safe to call concurrently.
pub trait Detector: Send + Sync + std::fmt::Debug {
    /// Compare reference and production samples for one column
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult>;

    /// Identifier reported in results
    fn name(&self) -> &'static str;

    /// Threshold used for the drift decision
    fn threshold(&self) -> f64;
}

/// Epsilon floor applied to proportions before log-ratio computations
pub(crate) const PROPORTION_EPS: f64 = 1e-10;

/// Threshold configuration for drift detectors
///
/// Built from defaults overlaid with caller overrides at construction.
/// Treated as read-only for the lifetime of an engine; [`Thresholds::set`]
/// is the only mutation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    values: BTreeMap<String, f64>,
}

impl Thresholds {
    const DEFAULTS: [(&'static str, f64); 7] = [
        ("psi", 0.2),
        ("ks_pvalue", 0.05),
        ("wasserstein", 0.1),
        ("chi2_pvalue", 0.05),
        ("jensen_shannon", 0.1),
        ("anderson_darling_pvalue", 0.05),
        ("cramer_von_mises_pvalue", 0.05),
    ];

    /// Defaults overlaid with the given overrides
    pub fn with_overrides<S: Into<String>>(overrides: impl IntoIterator<Item = (S, f64)>) -> Self {
        let mut t = Self::default();
        for (key, value) in overrides {
            t.values.insert(key.into(), value);
        }
        t
    }

    /// Threshold for a key, falling back to the given default
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    /// Override a single threshold
    pub fn set<S: Into<String>>(&mut self, key: S, value: f64) {
        self.values.insert(key.into(), value);
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            values: Self::DEFAULTS
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

/// Shared validation: both samples must be non-empty
pub(crate) fn validate_samples(reference: &Column, production: &Column) -> Result<()> {
    if reference.is_empty() {
        return Err(DriftError::EmptySample(
            "reference sample cannot be empty".to_string(),
        ));
    }
    if production.is_empty() {
        return Err(DriftError::EmptySample(
            "production sample cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Numeric values of both samples with missing entries removed
///
/// Fails with [`DriftError::EmptySample`] when either side has no values
/// left after filtering.
pub(crate) fn numeric_pair(reference: &Column, production: &Column) -> Result<(Vec<f64>, Vec<f64>)> {
    validate_samples(reference, production)?;
    let r = reference.numeric_values()?;
    let p = production.numeric_values()?;
    if r.is_empty() {
        return Err(DriftError::EmptySample(
            "reference sample has no values after removing missing entries".to_string(),
        ));
    }
    if p.is_empty() {
        return Err(DriftError::EmptySample(
            "production sample has no values after removing missing entries".to_string(),
        ));
    }
    Ok((r, p))
}
