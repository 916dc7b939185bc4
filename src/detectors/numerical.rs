//! Numerical feature drift detectors

use crate::data::Column;
use crate::detectors::{numeric_pair, DetectionResult, Detector, PROPORTION_EPS};
use crate::error::Result;
use crate::stats;

/// Population Stability Index detector
///
/// Buckets the reference sample into quantile-derived bins and compares
/// bin occupancy proportions. Common interpretation: PSI < 0.1 no change,
/// 0.1..0.2 minor shift, >= 0.2 significant shift.
#[derive(Debug, Clone)]
pub struct PsiDetector {
    threshold: f64,
    buckets: usize,
}

impl PsiDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            buckets: 10,
        }
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets.max(2);
        self
    }

    fn calculate_psi(&self, reference: &[f64], production: &[f64]) -> f64 {
        let mut sorted_ref = reference.to_vec();
        sorted_ref.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // quantile breakpoints from the reference sample only
        let mut edges: Vec<f64> = (0..=self.buckets)
            .map(|i| stats::quantile_sorted(&sorted_ref, i as f64 / self.buckets as f64))
            .collect();
        edges.dedup();

        if edges.len() < 2 {
            // constant reference data, no variation to measure shift against
            return 0.0;
        }

        let ref_pct = bin_proportions(reference, &edges);
        let prod_pct = bin_proportions(production, &edges);

        ref_pct
            .iter()
            .zip(prod_pct.iter())
            .map(|(&r, &p)| (p - r) * (p / r).ln())
            .sum()
    }
}

impl Default for PsiDetector {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl Detector for PsiDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        let (r, p) = numeric_pair(reference, production)?;
        let psi = self.calculate_psi(&r, &p);
        Ok(DetectionResult {
            has_drift: psi >= self.threshold,
            score: psi,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: None,
        })
    }

    fn name(&self) -> &'static str {
        "psi"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Bin occupancy proportions over shared edges, clamped to the epsilon
/// floor; values outside the edge range are not counted but the divisor
/// stays the full sample size
fn bin_proportions(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let n_bins = edges.len() - 1;
    let mut counts = vec![0usize; n_bins];
    for &v in values {
        if v < edges[0] || v > edges[n_bins] {
            continue;
        }
        // rightmost bin is closed on both sides
        let mut idx = edges[..n_bins].partition_point(|&e| e <= v);
        idx = idx.saturating_sub(1).min(n_bins - 1);
        counts[idx] += 1;
    }
    let n = values.len() as f64;
    counts
        .iter()
        .map(|&c| (c as f64 / n).clamp(PROPORTION_EPS, 1.0))
        .collect()
}

/// Two-sample Kolmogorov-Smirnov detector
#[derive(Debug, Clone)]
pub struct KsDetector {
    threshold: f64,
}

impl KsDetector {
    /// `threshold` is the p-value below which drift is flagged
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for KsDetector {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl Detector for KsDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        let (r, p) = numeric_pair(reference, production)?;
        let (statistic, p_value) = stats::ks_2samp(&r, &p);
        Ok(DetectionResult {
            has_drift: p_value < self.threshold,
            score: statistic,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: Some(p_value),
        })
    }

    fn name(&self) -> &'static str {
        "ks_test"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Wasserstein (earth mover's) distance detector
///
/// The raw distance is normalized by the reference standard deviation so
/// the threshold is comparable across features; left unchanged when the
/// reference has zero variance.
#[derive(Debug, Clone)]
pub struct WassersteinDetector {
    threshold: f64,
}

impl WassersteinDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for WassersteinDetector {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Detector for WassersteinDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        let (r, p) = numeric_pair(reference, production)?;
        let distance = stats::wasserstein_distance(&r, &p);
        let ref_std = stats::std_dev(&r);
        let normalized = if ref_std > 0.0 {
            distance / ref_std
        } else {
            distance
        };
        Ok(DetectionResult {
            has_drift: normalized >= self.threshold,
            score: normalized,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: None,
        })
    }

    fn name(&self) -> &'static str {
        "wasserstein"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Jensen-Shannon divergence detector
///
/// Histograms both samples on bin edges shared across their union,
/// then computes the symmetric KL-based divergence against the midpoint
/// mixture. Scores use base 2 so the range is [0, 1].
#[derive(Debug, Clone)]
pub struct JensenShannonDetector {
    threshold: f64,
    buckets: usize,
}

impl JensenShannonDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            buckets: 50,
        }
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets.max(2);
        self
    }

    fn histogram(&self, values: &[f64], min: f64, max: f64) -> Vec<f64> {
        let width = (max - min) / self.buckets as f64;
        let mut counts = vec![0usize; self.buckets];
        for &v in values {
            let bin = (((v - min) / width).floor() as usize).min(self.buckets - 1);
            counts[bin] += 1;
        }
        let n = values.len() as f64;
        counts
            .iter()
            .map(|&c| c as f64 / n + PROPORTION_EPS)
            .collect()
    }

    fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
        p.iter()
            .zip(q.iter())
            .map(|(&pi, &qi)| if pi > 0.0 { pi * (pi / qi).ln() } else { 0.0 })
            .sum()
    }
}

impl Default for JensenShannonDetector {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Detector for JensenShannonDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        let (r, p) = numeric_pair(reference, production)?;

        let min = r
            .iter()
            .chain(p.iter())
            .copied()
            .fold(f64::INFINITY, f64::min);
        let max = r
            .iter()
            .chain(p.iter())
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let score = if (max - min).abs() < PROPORTION_EPS {
            // both samples concentrated on one value
            0.0
        } else {
            let hp = self.histogram(&r, min, max);
            let hq = self.histogram(&p, min, max);
            let mix: Vec<f64> = hp
                .iter()
                .zip(hq.iter())
                .map(|(&a, &b)| (a + b) / 2.0)
                .collect();
            let js =
                (Self::kl_divergence(&hp, &mix) + Self::kl_divergence(&hq, &mix)) / 2.0;
            js / 2.0_f64.ln()
        };

        Ok(DetectionResult {
            has_drift: score >= self.threshold,
            score,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: None,
        })
    }

    fn name(&self) -> &'static str {
        "jensen_shannon"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Two-sample Anderson-Darling detector
#[derive(Debug, Clone)]
pub struct AndersonDarlingDetector {
    threshold: f64,
}

impl AndersonDarlingDetector {
    /// `threshold` is the p-value below which drift is flagged
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for AndersonDarlingDetector {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl Detector for AndersonDarlingDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        let (r, p) = numeric_pair(reference, production)?;
        let (statistic, p_value) = stats::anderson_darling_2samp(&r, &p);
        Ok(DetectionResult {
            has_drift: p_value < self.threshold,
            score: statistic,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: Some(p_value),
        })
    }

    fn name(&self) -> &'static str {
        "anderson_darling"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Two-sample Cramer-von Mises detector
#[derive(Debug, Clone)]
pub struct CramerVonMisesDetector {
    threshold: f64,
}

impl CramerVonMisesDetector {
    /// `threshold` is the p-value below which drift is flagged
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for CramerVonMisesDetector {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl Detector for CramerVonMisesDetector {
    fn detect(&self, reference: &Column, production: &Column) -> Result<DetectionResult> {
        let (r, p) = numeric_pair(reference, production)?;
        let (statistic, p_value) = stats::cramer_von_mises_2samp(&r, &p);
        Ok(DetectionResult {
            has_drift: p_value < self.threshold,
            score: statistic,
            method: self.name().to_string(),
            threshold: self.threshold,
            p_value: Some(p_value),
        })
    }

    fn name(&self) -> &'static str {
        "cramer_von_mises"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriftError;

    fn numeric(values: Vec<f64>) -> Column {
        Column::Numeric(values)
    }

    #[test]
    fn test_psi_identical_distributions() {
        let data: Vec<f64> = (0..1000).map(|i| (i % 100) as f64).collect();
        let detector = PsiDetector::default();
        let result = detector
            .detect(&numeric(data.clone()), &numeric(data))
            .unwrap();
        assert!(!result.has_drift);
        assert!(result.score < 0.01);
        assert_eq!(result.method, "psi");
        assert!(result.p_value.is_none());
    }

    #[test]
    fn test_psi_shifted_distribution() {
        let reference: Vec<f64> = (0..1000).map(|i| (i % 100) as f64).collect();
        let production: Vec<f64> = (0..1000).map(|i| 500.0 + (i % 100) as f64).collect();
        let detector = PsiDetector::default();
        let result = detector
            .detect(&numeric(reference), &numeric(production))
            .unwrap();
        assert!(result.has_drift);
        assert!(result.score >= 0.2);
    }

    #[test]
    fn test_psi_non_negative() {
        let reference: Vec<f64> = (0..500).map(|i| (i % 37) as f64).collect();
        let production: Vec<f64> = (0..400).map(|i| (i % 53) as f64).collect();
        let result = PsiDetector::default()
            .detect(&numeric(reference), &numeric(production))
            .unwrap();
        assert!(result.score >= 0.0);
    }

    #[test]
    fn test_psi_constant_reference_scores_zero() {
        let reference = vec![5.0; 100];
        let production: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let result = PsiDetector::default()
            .detect(&numeric(reference), &numeric(production))
            .unwrap();
        assert!(!result.has_drift);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_ks_identical_data() {
        let data: Vec<f64> = (0..500).map(|i| (i as f64 * 0.7).sin()).collect();
        let result = KsDetector::default()
            .detect(&numeric(data.clone()), &numeric(data))
            .unwrap();
        assert!(!result.has_drift);
        assert!(result.p_value.unwrap() > 0.05);
    }

    #[test]
    fn test_ks_detects_shift() {
        let reference: Vec<f64> = (0..500).map(|i| i as f64 / 100.0).collect();
        let production: Vec<f64> = (0..500).map(|i| 20.0 + i as f64 / 100.0).collect();
        let result = KsDetector::default()
            .detect(&numeric(reference), &numeric(production))
            .unwrap();
        assert!(result.has_drift);
        assert!(result.p_value.unwrap() < 0.05);
    }

    #[test]
    fn test_wasserstein_zero_variance_reference() {
        let reference = vec![3.0; 50];
        let production = vec![3.05; 50];
        let result = WassersteinDetector::default()
            .detect(&numeric(reference), &numeric(production))
            .unwrap();
        // raw distance, not normalized
        assert!((result.score - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_jensen_shannon_identical_and_bounded() {
        let data: Vec<f64> = (0..1000).map(|i| (i % 200) as f64 / 10.0).collect();
        let detector = JensenShannonDetector::default();
        let same = detector
            .detect(&numeric(data.clone()), &numeric(data.clone()))
            .unwrap();
        assert!(!same.has_drift);
        assert!(same.score < 0.01);

        let far: Vec<f64> = data.iter().map(|x| x + 1000.0).collect();
        let result = detector.detect(&numeric(data), &numeric(far)).unwrap();
        assert!(result.has_drift);
        assert!(result.score > 0.0 && result.score <= 1.0);
    }

    #[test]
    fn test_jensen_shannon_symmetric() {
        let a: Vec<f64> = (0..800).map(|i| (i % 100) as f64).collect();
        let b: Vec<f64> = (0..800).map(|i| 30.0 + (i % 100) as f64).collect();
        let detector = JensenShannonDetector::default();
        let forward = detector
            .detect(&numeric(a.clone()), &numeric(b.clone()))
            .unwrap();
        let backward = detector.detect(&numeric(b), &numeric(a)).unwrap();
        assert!((forward.score - backward.score).abs() < 0.01);
    }

    #[test]
    fn test_missing_values_are_filtered() {
        let reference = vec![1.0, 2.0, f64::NAN, 3.0, 4.0, 5.0, f64::NAN];
        let production = vec![1.5, 2.5, 3.5, f64::NAN, 4.5];
        let result = KsDetector::default()
            .detect(&numeric(reference), &numeric(production))
            .unwrap();
        assert!(!result.has_drift);
    }

    #[test]
    fn test_empty_reference_rejected() {
        let err = PsiDetector::default()
            .detect(&numeric(vec![]), &numeric(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, DriftError::EmptySample(_)));
    }

    #[test]
    fn test_anderson_darling_detects_shift() {
        let reference: Vec<f64> = (0..300).map(|i| (i % 60) as f64 / 10.0).collect();
        let production: Vec<f64> = reference.iter().map(|x| x + 50.0).collect();
        let result = AndersonDarlingDetector::default()
            .detect(&numeric(reference), &numeric(production))
            .unwrap();
        assert!(result.has_drift);
        assert_eq!(result.method, "anderson_darling");
    }

    #[test]
    fn test_cramer_von_mises_no_drift_on_identical() {
        let data: Vec<f64> = (0..300).map(|i| (i as f64 * 0.31).cos()).collect();
        let result = CramerVonMisesDetector::default()
            .detect(&numeric(data.clone()), &numeric(data))
            .unwrap();
        assert!(!result.has_drift);
        assert!(result.p_value.unwrap() > 0.05);
    }
}
