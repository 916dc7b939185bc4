//! Unified drift monitoring across feature, prediction, and concept drift
//!
//! [`DriftSuite`] wires the three monitors behind one interface and
//! produces a [`ComprehensiveReport`] that keeps each drift type
//! separate. Each type is checked only when its inputs are supplied.

use ndarray::Array1;
use tracing::info;

use crate::data::Dataset;
use crate::detectors::Thresholds;
use crate::error::{DriftError, Result};
use crate::monitor::concept::{ConceptMonitor, DegradationMode};
use crate::monitor::feature::FeatureMonitor;
use crate::monitor::prediction::{PredictionMonitor, Predictions, Task};
use crate::report::ComprehensiveReport;

/// Labeled data for a concept drift check, covering both periods
#[derive(Debug, Clone, Copy)]
pub struct LabeledOutcomes<'a> {
    pub y_true_ref: &'a Array1<f64>,
    pub y_pred_ref: &'a Array1<f64>,
    pub y_true_prod: &'a Array1<f64>,
    pub y_pred_prod: &'a Array1<f64>,
}

/// Inputs for one suite check; absent fields skip that drift type
#[derive(Default)]
pub struct SuiteInputs<'a> {
    pub production_data: Option<&'a Dataset>,
    pub production_predictions: Option<&'a Predictions>,
    pub outcomes: Option<LabeledOutcomes<'a>>,
}

/// Builder for [`DriftSuite`]
pub struct DriftSuiteBuilder {
    reference: Dataset,
    features: Option<Vec<String>>,
    reference_predictions: Option<Predictions>,
    task: Task,
    prediction_detector: String,
    thresholds: Thresholds,
    performance_metrics: Option<Vec<String>>,
    metric_overrides: Vec<(String, f64)>,
    degradation_mode: DegradationMode,
    model_version: Option<String>,
}

impl DriftSuiteBuilder {
    fn new(reference: Dataset) -> Self {
        Self {
            reference,
            features: None,
            reference_predictions: None,
            task: Task::Classification,
            prediction_detector: "psi".to_string(),
            thresholds: Thresholds::default(),
            performance_metrics: None,
            metric_overrides: Vec::new(),
            degradation_mode: DegradationMode::Absolute,
            model_version: None,
        }
    }

    /// Restrict feature drift monitoring to these columns
    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = Some(features);
        self
    }

    /// Enable prediction drift monitoring against these reference outputs
    pub fn with_reference_predictions(mut self, predictions: Predictions) -> Self {
        self.reference_predictions = Some(predictions);
        self
    }

    /// Task used for prediction and concept monitoring
    /// (default: classification)
    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    /// Detector used for prediction drift (default: "psi")
    pub fn with_prediction_detector(mut self, name: impl Into<String>) -> Self {
        self.prediction_detector = name.into();
        self
    }

    /// Detector thresholds shared by the feature and prediction monitors
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Metrics tracked for concept drift instead of the task defaults
    pub fn with_performance_metrics(mut self, metrics: Vec<String>) -> Self {
        self.performance_metrics = Some(metrics);
        self
    }

    /// Override a single metric's degradation threshold
    pub fn with_metric_threshold(mut self, metric: impl Into<String>, threshold: f64) -> Self {
        self.metric_overrides.push((metric.into(), threshold));
        self
    }

    /// How metric degradation is measured (default: absolute)
    pub fn with_degradation_mode(mut self, mode: DegradationMode) -> Self {
        self.degradation_mode = mode;
        self
    }

    /// Model version recorded in every report
    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    pub fn build(self) -> Result<DriftSuite> {
        let feature_monitor = match self.features {
            Some(features) => {
                FeatureMonitor::with_features(self.reference, features, self.thresholds.clone())?
            }
            None => FeatureMonitor::new(self.reference, self.thresholds.clone())?,
        };

        let prediction_monitor = match self.reference_predictions {
            Some(reference) => Some(PredictionMonitor::with_detector(
                reference,
                &self.prediction_detector,
                self.thresholds,
                Some(self.task),
            )?),
            None => None,
        };

        let overrides: Vec<(&str, f64)> = self
            .metric_overrides
            .iter()
            .map(|(name, t)| (name.as_str(), *t))
            .collect();
        let concept_monitor = match &self.performance_metrics {
            Some(metrics) => {
                let names: Vec<&str> = metrics.iter().map(String::as_str).collect();
                ConceptMonitor::with_metrics(self.task, &names, &overrides, self.degradation_mode)?
            }
            None if overrides.is_empty() && self.degradation_mode == DegradationMode::Absolute => {
                ConceptMonitor::new(self.task)
            }
            None => {
                let names: Vec<&str> = ConceptMonitor::new(self.task)
                    .metrics()
                    .iter()
                    .map(|m| m.as_str())
                    .collect();
                ConceptMonitor::with_metrics(self.task, &names, &overrides, self.degradation_mode)?
            }
        };

        Ok(DriftSuite {
            feature_monitor,
            prediction_monitor,
            concept_monitor,
            model_version: self.model_version,
        })
    }
}

/// Unified drift monitoring suite
///
/// The feature and concept monitors are always constructed; the
/// prediction monitor only when reference predictions were provided.
#[derive(Debug)]
pub struct DriftSuite {
    feature_monitor: FeatureMonitor,
    prediction_monitor: Option<PredictionMonitor>,
    concept_monitor: ConceptMonitor,
    model_version: Option<String>,
}

impl DriftSuite {
    /// Start building a suite around a reference dataset
    pub fn builder(reference: Dataset) -> DriftSuiteBuilder {
        DriftSuiteBuilder::new(reference)
    }

    /// Suite monitoring all columns of `reference` with default settings
    pub fn new(reference: Dataset) -> Result<Self> {
        Self::builder(reference).build()
    }

    /// Run every drift check whose inputs are present
    ///
    /// Prediction drift additionally requires the suite to have been
    /// built with reference predictions; supplying production
    /// predictions to a suite without them is an error rather than a
    /// silent skip.
    pub fn check(&self, inputs: SuiteInputs<'_>) -> Result<ComprehensiveReport> {
        let feature = match inputs.production_data {
            Some(production) => Some(self.feature_monitor.check(production)?),
            None => None,
        };

        let prediction = match (inputs.production_predictions, &self.prediction_monitor) {
            (Some(production), Some(monitor)) => Some(monitor.check(production)?),
            (Some(_), None) => {
                return Err(DriftError::DataError(
                    "suite was built without reference predictions; \
                     cannot check prediction drift"
                        .to_string(),
                ));
            }
            (None, _) => None,
        };

        let concept = match inputs.outcomes {
            Some(outcomes) => Some(self.concept_monitor.check(
                outcomes.y_true_ref,
                outcomes.y_pred_ref,
                outcomes.y_true_prod,
                outcomes.y_pred_prod,
            )?),
            None => None,
        };

        let mut report = ComprehensiveReport::new(feature, prediction, concept);
        if let Some(version) = &self.model_version {
            report = report.with_model_version(version.clone());
        }

        info!(
            status = report.status().as_str(),
            drift_types = report.drift_types_detected().len(),
            "drift suite check complete"
        );
        Ok(report)
    }

    pub fn feature_monitor(&self) -> &FeatureMonitor {
        &self.feature_monitor
    }

    pub fn prediction_monitor(&self) -> Option<&PredictionMonitor> {
        self.prediction_monitor.as_ref()
    }

    pub fn concept_monitor(&self) -> &ConceptMonitor {
        &self.concept_monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::report::DriftType;
    use ndarray::array;

    fn reference_dataset() -> Dataset {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        Dataset::from_columns(vec![("score".to_string(), Column::Numeric(values))]).unwrap()
    }

    #[test]
    fn test_feature_only_check() {
        let suite = DriftSuite::new(reference_dataset()).unwrap();
        let production = reference_dataset();
        let report = suite
            .check(SuiteInputs {
                production_data: Some(&production),
                ..Default::default()
            })
            .unwrap();

        assert!(report.feature.is_some());
        assert!(report.prediction.is_none());
        assert!(report.concept.is_none());
        assert!(!report.has_drift());
    }

    #[test]
    fn test_empty_inputs_yield_empty_report() {
        let suite = DriftSuite::new(reference_dataset()).unwrap();
        let report = suite.check(SuiteInputs::default()).unwrap();
        assert!(report.feature.is_none());
        assert!(report.drift_types_detected().is_empty());
    }

    #[test]
    fn test_prediction_drift_requires_reference_predictions() {
        let suite = DriftSuite::new(reference_dataset()).unwrap();
        let production = Predictions::Regression(array![1.0, 2.0, 3.0]);
        let err = suite
            .check(SuiteInputs {
                production_predictions: Some(&production),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DriftError::DataError(_)));
    }

    #[test]
    fn test_full_check_all_drift_types() {
        let ref_preds = Predictions::Regression(Array1::from_iter((0..50).map(|i| i as f64)));
        let suite = DriftSuite::builder(reference_dataset())
            .with_task(Task::Regression)
            .with_reference_predictions(ref_preds)
            .with_model_version("v2.1.0")
            .build()
            .unwrap();

        // shifted production features and predictions, degraded outcomes
        let shifted: Vec<f64> = (0..100).map(|i| i as f64 / 10.0 + 40.0).collect();
        let production =
            Dataset::from_columns(vec![("score".to_string(), Column::Numeric(shifted))]).unwrap();
        let prod_preds = Predictions::Regression(Array1::from_iter((0..50).map(|i| i as f64 + 80.0)));
        let y_true = Array1::from_iter((0..50).map(|i| i as f64));
        let y_off = Array1::from_iter((0..50).map(|i| i as f64 + 25.0));

        let report = suite
            .check(SuiteInputs {
                production_data: Some(&production),
                production_predictions: Some(&prod_preds),
                outcomes: Some(LabeledOutcomes {
                    y_true_ref: &y_true,
                    y_pred_ref: &y_true,
                    y_true_prod: &y_true,
                    y_pred_prod: &y_off,
                }),
            })
            .unwrap();

        assert!(report.has_drift());
        assert_eq!(
            report.drift_types_detected(),
            vec![DriftType::Feature, DriftType::Prediction, DriftType::Concept]
        );
        assert_eq!(report.model_version.as_deref(), Some("v2.1.0"));
        assert_eq!(
            report.feature.as_ref().unwrap().model_version, None,
            "model version lives on the comprehensive report"
        );
    }

    #[test]
    fn test_builder_propagates_unknown_detector() {
        let ref_preds = Predictions::Regression(array![1.0, 2.0, 3.0]);
        let err = DriftSuite::builder(reference_dataset())
            .with_reference_predictions(ref_preds)
            .with_prediction_detector("mmd")
            .build()
            .unwrap_err();
        assert!(matches!(err, DriftError::UnknownDetector(_)));
    }

    #[test]
    fn test_builder_custom_metrics() {
        let suite = DriftSuite::builder(reference_dataset())
            .with_task(Task::Regression)
            .with_performance_metrics(vec!["mae".to_string(), "r2".to_string()])
            .with_metric_threshold("mae", 0.5)
            .build()
            .unwrap();

        let names: Vec<&str> = suite
            .concept_monitor()
            .metrics()
            .iter()
            .map(|m| m.as_str())
            .collect();
        assert_eq!(names, vec!["mae", "r2"]);
    }
}
