//! Concept drift monitoring via performance degradation
//!
//! Concept drift (a change in P(Y|X)) is observed indirectly: the same
//! model's performance metrics are computed on a reference period and a
//! production period, and a metric that degraded beyond its threshold is
//! reported as a drifted "feature" named after the metric.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DriftError, Result};
use crate::metrics::Metric;
use crate::monitor::Task;
use crate::report::{DriftReport, DriftType, FeatureDriftResult};

/// How metric degradation is measured against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationMode {
    /// Raw difference between production and reference values
    Absolute,
    /// Change relative to the absolute reference value
    Relative,
}

/// Detailed comparison for one metric, returned alongside the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceComparison {
    pub metric: Metric,
    pub reference_value: f64,
    pub production_value: f64,
    /// production minus reference
    pub absolute_change: f64,
    /// absolute change over |reference|; +/- infinity when the reference
    /// value is exactly 0 and the change is nonzero
    pub relative_change: f64,
    pub has_degradation: bool,
    pub threshold: f64,
}

/// Monitor tracking model performance between two periods
#[derive(Debug)]
pub struct ConceptMonitor {
    task: Task,
    metrics: Vec<Metric>,
    thresholds: Vec<f64>,
    mode: DegradationMode,
}

impl ConceptMonitor {
    /// Monitor with the default metric set for the task:
    /// {accuracy, f1} for classification, {rmse, r2} for regression
    pub fn new(task: Task) -> Self {
        let metrics = match task {
            Task::Classification => vec![Metric::Accuracy, Metric::F1],
            Task::Regression => vec![Metric::Rmse, Metric::R2],
        };
        Self::build(task, metrics, &[], DegradationMode::Absolute)
    }

    /// Monitor with explicit metric names, per-metric threshold
    /// overrides, and degradation mode
    pub fn with_metrics(
        task: Task,
        metric_names: &[&str],
        threshold_overrides: &[(&str, f64)],
        mode: DegradationMode,
    ) -> Result<Self> {
        let metrics: Vec<Metric> = metric_names
            .iter()
            .map(|name| name.parse())
            .collect::<Result<_>>()?;
        Ok(Self::build(task, metrics, threshold_overrides, mode))
    }

    fn build(
        task: Task,
        metrics: Vec<Metric>,
        threshold_overrides: &[(&str, f64)],
        mode: DegradationMode,
    ) -> Self {
        let thresholds = metrics
            .iter()
            .map(|m| {
                threshold_overrides
                    .iter()
                    .find(|(name, _)| *name == m.as_str())
                    .map(|(_, t)| *t)
                    .unwrap_or_else(|| m.default_threshold())
            })
            .collect();
        Self {
            task,
            metrics,
            thresholds,
            mode,
        }
    }

    /// Check for concept drift, returning only the report
    pub fn check(
        &self,
        y_true_ref: &Array1<f64>,
        y_pred_ref: &Array1<f64>,
        y_true_prod: &Array1<f64>,
        y_pred_prod: &Array1<f64>,
    ) -> Result<DriftReport> {
        self.check_detailed(y_true_ref, y_pred_ref, y_true_prod, y_pred_prod)
            .map(|(report, _)| report)
    }

    /// Check for concept drift, returning the report together with the
    /// per-metric comparison details
    pub fn check_detailed(
        &self,
        y_true_ref: &Array1<f64>,
        y_pred_ref: &Array1<f64>,
        y_true_prod: &Array1<f64>,
        y_pred_prod: &Array1<f64>,
    ) -> Result<(DriftReport, Vec<PerformanceComparison>)> {
        if y_true_ref.is_empty() || y_pred_ref.is_empty() {
            return Err(DriftError::EmptyDataset(
                "reference labels cannot be empty".to_string(),
            ));
        }
        if y_true_prod.is_empty() || y_pred_prod.is_empty() {
            return Err(DriftError::EmptyDataset(
                "production labels cannot be empty".to_string(),
            ));
        }
        if y_true_ref.len() != y_pred_ref.len() {
            return Err(DriftError::LengthMismatch(format!(
                "reference y_true has {} entries, y_pred has {}",
                y_true_ref.len(),
                y_pred_ref.len()
            )));
        }
        if y_true_prod.len() != y_pred_prod.len() {
            return Err(DriftError::LengthMismatch(format!(
                "production y_true has {} entries, y_pred has {}",
                y_true_prod.len(),
                y_pred_prod.len()
            )));
        }

        debug!(
            task = self.task.as_str(),
            metrics = self.metrics.len(),
            "running concept drift check"
        );

        let mut feature_results = Vec::with_capacity(self.metrics.len());
        let mut comparisons = Vec::with_capacity(self.metrics.len());

        for (metric, &threshold) in self.metrics.iter().zip(&self.thresholds) {
            let ref_value = metric.compute(y_true_ref, y_pred_ref);
            let prod_value = metric.compute(y_true_prod, y_pred_prod);

            let abs_change = prod_value - ref_value;
            let rel_change = if ref_value != 0.0 {
                abs_change / ref_value.abs()
            } else if abs_change != 0.0 {
                f64::INFINITY * abs_change.signum()
            } else {
                0.0
            };

            let change = match self.mode {
                DegradationMode::Absolute => abs_change,
                DegradationMode::Relative => rel_change,
            };
            // higher-is-better metrics degrade by dropping, lower-is-better
            // by rising; the score is the magnitude of the bad change
            let (has_degradation, drift_score) = if metric.higher_is_better() {
                (change < -threshold, (-abs_change).max(0.0))
            } else {
                (change > threshold, abs_change.max(0.0))
            };

            comparisons.push(PerformanceComparison {
                metric: *metric,
                reference_value: ref_value,
                production_value: prod_value,
                absolute_change: abs_change,
                relative_change: rel_change,
                has_degradation,
                threshold,
            });

            feature_results.push(FeatureDriftResult {
                feature_name: metric.as_str().to_string(),
                has_drift: has_degradation,
                score: drift_score,
                method: match self.mode {
                    DegradationMode::Absolute => "performance_absolute".to_string(),
                    DegradationMode::Relative => "performance_relative".to_string(),
                },
                threshold,
                p_value: None,
                drift_type: DriftType::Concept,
            });
        }

        let report = DriftReport::new(feature_results, y_true_ref.len(), y_true_prod.len());
        Ok((report, comparisons))
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn mode(&self) -> DegradationMode {
        self.mode
    }
}
