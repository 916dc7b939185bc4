//! Categorical feature drift detectors

use std::collections::BTreeSet;

use crate::data::Column;
use crate::detectors::{validate_samples, DetectionResult, Detector, PROPORTION_EPS};
use crate::error::Result;
use crate::stats;

/// Aligned category frequencies over the union of both samples' categories
fn aligned_frequencies(reference: &Column, production: &Column) -> (Vec<f64>, Vec<f64>) {
    let ref_counts = reference.value_counts();
    let prod_counts = production.value_counts();

    let categories: BTreeSet<&String> = ref_counts.keys().chain(prod_counts.keys()).collect();

    let ref_freq = categories
        .iter()
        .map(|c| ref_counts.get(*c).copied().unwrap_or(0) as f64)
        .collect();
    let prod_freq = categories
        .iter()
        .map(|c| prod_counts.get(*c).copied().unwrap_or(0) as f64)
        .collect();
    (ref_freq, prod_freq)
}

/// Chi-squared test on category frequencies
///
/// Expected frequencies come from the reference proportions scaled to the
/// production sample size. If either sample has zero total frequency the
/// result is drift with an infinite score and zero p-value.
#[derive(Debug, Clone)]
pub struct ChiSquaredDetector {
    threshold: f64,
}

impl ChiSquaredDetector {
    /// `threshold` is the p-value below which drift is flagged
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for ChiSquaredDetector {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl Detector for ChiSquaredDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        validate_samples(reference, production)?;

        let (ref_freq, prod_freq) = aligned_frequencies(reference, production);
        let ref_total: f64 = ref_freq.iter().sum();
        let prod_total: f64 = prod_freq.iter().sum();

        if ref_total == 0.0 || prod_total == 0.0 {
            return Ok(DetectionResult {
                has_drift: true,
                score: f64::INFINITY,
                method: self.name().to_string(),
                threshold: self.threshold,
                p_value: Some(0.0),
            });
        }

        let statistic: f64 = ref_freq
            .iter()
            .zip(prod_freq.iter())
            .map(|(&rf, &pf)| {
                let expected = (rf / ref_total * prod_total).max(PROPORTION_EPS);
                (pf - expected).powi(2) / expected
            })
            .sum();

        let dof = (ref_freq.len().saturating_sub(1)).max(1) as f64;
        let p_value = stats::chi2_survival(statistic, dof);

        Ok(DetectionResult {
            has_drift: p_value < self.threshold,
            score: statistic,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: Some(p_value),
        })
    }

    fn name(&self) -> &'static str {
        "chi_squared"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// PSI applied to category frequency proportions
#[derive(Debug, Clone)]
pub struct FrequencyPsiDetector {
    threshold: f64,
}

impl FrequencyPsiDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for FrequencyPsiDetector {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl Detector for FrequencyPsiDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        validate_samples(reference, production)?;

        let (ref_freq, prod_freq) = aligned_frequencies(reference, production);
        let ref_total: f64 = ref_freq.iter().sum::<f64>().max(PROPORTION_EPS);
        let prod_total: f64 = prod_freq.iter().sum::<f64>().max(PROPORTION_EPS);

        let psi: f64 = ref_freq
            .iter()
            .zip(prod_freq.iter())
            .map(|(&rf, &pf)| {
                let r = (rf / ref_total).max(PROPORTION_EPS);
                let p = (pf / prod_total).max(PROPORTION_EPS);
                (p - r) * (p / r).ln()
            })
            .sum();

        Ok(DetectionResult {
            has_drift: psi >= self.threshold,
            score: psi,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: None,
        })
    }

    fn name(&self) -> &'static str {
        "frequency_psi"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}
