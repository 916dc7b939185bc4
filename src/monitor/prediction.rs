//! Prediction drift monitoring

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::data::Column;
use crate::detectors::{detector_by_name, Detector, Thresholds};
use crate::error::{DriftError, Result};
use crate::report::{DriftReport, DriftType, FeatureDriftResult};

/// Model outputs for one period
///
/// Regression outputs are a single scalar series; classification outputs
/// are one score column per class.
#[derive(Debug, Clone)]
pub enum Predictions {
    Regression(Array1<f64>),
    Classification {
        class_names: Vec<String>,
        scores: Array2<f64>,
    },
}

impl Predictions {
    /// Classification scores with default class names `class_0..class_n`
    pub fn from_scores(scores: Array2<f64>) -> Self {
        let class_names = (0..scores.ncols()).map(|i| format!("class_{i}")).collect();
        Predictions::Classification {
            class_names,
            scores,
        }
    }

    pub fn n_rows(&self) -> usize {
        match self {
            Predictions::Regression(v) => v.len(),
            Predictions::Classification { scores, .. } => scores.nrows(),
        }
    }

    /// Named output columns, "prediction" for the regression case
    fn columns(&self) -> Vec<(String, Column)> {
        match self {
            Predictions::Regression(v) => {
                vec![("prediction".to_string(), Column::Numeric(v.to_vec()))]
            }
            Predictions::Classification {
                class_names,
                scores,
            } => class_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), Column::Numeric(scores.column(i).to_vec())))
                .collect(),
        }
    }

    fn column_names(&self) -> Vec<String> {
        match self {
            Predictions::Regression(_) => vec!["prediction".to_string()],
            Predictions::Classification { class_names, .. } => class_names.clone(),
        }
    }
}

/// Task the monitored model performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Classification,
    Regression,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Classification => "classification",
            Task::Regression => "regression",
        }
    }
}

impl std::str::FromStr for Task {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "classification" => Ok(Task::Classification),
            "regression" => Ok(Task::Regression),
            other => Err(DriftError::InvalidTask(format!(
                "must be 'classification' or 'regression', got '{other}'"
            ))),
        }
    }
}

/// Monitor comparing production prediction distributions against the
/// reference period
///
/// A single named detector (default PSI) is applied uniformly across all
/// prediction columns: unlike feature drift there is no per-column kind
/// selection, since every output column is a numeric score.
#[derive(Debug)]
pub struct PredictionMonitor {
    reference: Vec<(String, Column)>,
    reference_rows: usize,
    task: Task,
    detector: Box<dyn Detector>,
    detector_name: String,
}

impl PredictionMonitor {
    /// Monitor with the default PSI detector and auto-detected task
    pub fn new(reference: Predictions, thresholds: Thresholds) -> Result<Self> {
        Self::with_detector(reference, "psi", thresholds, None)
    }

    /// Monitor with an explicit detector name and optional task override
    ///
    /// When `task` is `None` it is inferred from the reference shape:
    /// scalar outputs mean regression, per-class columns mean
    /// classification.
    pub fn with_detector(
        reference: Predictions,
        detector_name: &str,
        thresholds: Thresholds,
        task: Option<Task>,
    ) -> Result<Self> {
        if reference.n_rows() == 0 {
            return Err(DriftError::EmptyDataset(
                "reference predictions cannot be empty".to_string(),
            ));
        }

        let inferred = match &reference {
            Predictions::Regression(_) => Task::Regression,
            Predictions::Classification { .. } => Task::Classification,
        };

        Ok(Self {
            reference_rows: reference.n_rows(),
            reference: reference.columns(),
            task: task.unwrap_or(inferred),
            detector: detector_by_name(detector_name, &thresholds)?,
            detector_name: detector_name.to_string(),
        })
    }

    /// Check production predictions for drift against the reference
    pub fn check(&self, production: &Predictions) -> Result<DriftReport> {
        if production.n_rows() == 0 {
            return Err(DriftError::EmptyDataset(
                "production predictions cannot be empty".to_string(),
            ));
        }

        let ref_names: Vec<&str> = self.reference.iter().map(|(n, _)| n.as_str()).collect();
        let prod_names = production.column_names();
        if ref_names != prod_names.iter().map(String::as_str).collect::<Vec<_>>() {
            return Err(DriftError::ColumnMismatch(format!(
                "production prediction columns [{}] don't match reference columns [{}]",
                prod_names.join(", "),
                ref_names.join(", ")
            )));
        }

        debug!(
            columns = ref_names.len(),
            detector = %self.detector_name,
            "running prediction drift check"
        );

        let prod_columns = production.columns();
        let mut feature_results = Vec::with_capacity(self.reference.len());
        for ((name, ref_column), (_, prod_column)) in self.reference.iter().zip(&prod_columns) {
            let result = self.detector.detect(ref_column, prod_column)?;
            feature_results.push(FeatureDriftResult {
                feature_name: name.clone(),
                has_drift: result.has_drift,
                score: result.score,
                method: result.method,
                threshold: result.threshold,
                p_value: result.p_value,
                drift_type: DriftType::Prediction,
            });
        }

        Ok(DriftReport::new(
            feature_results,
            self.reference_rows,
            production.n_rows(),
        ))
    }

    pub fn task(&self) -> Task {
        self.task
    }

    /// Names of the monitored prediction outputs
    pub fn monitored_outputs(&self) -> Vec<&str> {
        self.reference.iter().map(|(n, _)| n.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn regression_reference() -> Predictions {
        Predictions::Regression(Array1::from_iter((0..200).map(|i| (i % 50) as f64)))
    }

    #[test]
    fn test_task_parse() {
        assert_eq!("regression".parse::<Task>().unwrap(), Task::Regression);
        let err = "ranking".parse::<Task>().unwrap_err();
        assert!(matches!(err, DriftError::InvalidTask(_)));
    }

    #[test]
    fn test_task_auto_detected() {
        let monitor =
            PredictionMonitor::new(regression_reference(), Thresholds::default()).unwrap();
        assert_eq!(monitor.task(), Task::Regression);
        assert_eq!(monitor.monitored_outputs(), vec!["prediction"]);

        let scores = Array2::from_shape_vec((4, 2), vec![0.9, 0.1, 0.8, 0.2, 0.3, 0.7, 0.4, 0.6])
            .unwrap();
        let monitor = PredictionMonitor::new(
            Predictions::from_scores(scores),
            Thresholds::default(),
        )
        .unwrap();
        assert_eq!(monitor.task(), Task::Classification);
        assert_eq!(monitor.monitored_outputs(), vec!["class_0", "class_1"]);
    }

    #[test]
    fn test_regression_no_drift() {
        let monitor =
            PredictionMonitor::new(regression_reference(), Thresholds::default()).unwrap();
        let report = monitor.check(&regression_reference()).unwrap();
        assert!(!report.has_drift());
        assert_eq!(report.feature_results.len(), 1);
        assert_eq!(report.feature_results[0].drift_type, DriftType::Prediction);
        assert_eq!(report.feature_results[0].feature_name, "prediction");
    }

    #[test]
    fn test_regression_shift_detected() {
        let monitor =
            PredictionMonitor::new(regression_reference(), Thresholds::default()).unwrap();
        let shifted =
            Predictions::Regression(Array1::from_iter((0..200).map(|i| 500.0 + (i % 50) as f64)));
        let report = monitor.check(&shifted).unwrap();
        assert!(report.has_drift());
        assert_eq!(report.feature_results[0].method, "psi");
    }

    #[test]
    fn test_per_class_results() {
        let mut values = Vec::new();
        for i in 0..100 {
            let p = (i % 10) as f64 / 10.0;
            values.extend([p, 1.0 - p]);
        }
        let reference = Predictions::Classification {
            class_names: vec!["negative".to_string(), "positive".to_string()],
            scores: Array2::from_shape_vec((100, 2), values).unwrap(),
        };
        let monitor = PredictionMonitor::new(reference.clone(), Thresholds::default()).unwrap();
        let report = monitor.check(&reference).unwrap();
        assert_eq!(report.feature_results.len(), 2);
        assert_eq!(report.feature_results[0].feature_name, "negative");
        assert_eq!(report.feature_results[1].feature_name, "positive");
        assert!(!report.has_drift());
    }

    #[test]
    fn test_column_mismatch_names_both_sets() {
        let monitor =
            PredictionMonitor::new(regression_reference(), Thresholds::default()).unwrap();
        let scores = Array2::from_shape_vec((2, 2), vec![0.9, 0.1, 0.2, 0.8]).unwrap();
        let err = monitor
            .check(&Predictions::from_scores(scores))
            .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, DriftError::ColumnMismatch(_)));
        assert!(message.contains("prediction"));
        assert!(message.contains("class_0"));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let err = PredictionMonitor::new(
            Predictions::Regression(array![]),
            Thresholds::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DriftError::EmptyDataset(_)));

        let monitor =
            PredictionMonitor::new(regression_reference(), Thresholds::default()).unwrap();
        let err = monitor
            .check(&Predictions::Regression(array![]))
            .unwrap_err();
        assert!(matches!(err, DriftError::EmptyDataset(_)));
    }

    #[test]
    fn test_unknown_detector_rejected() {
        let err = PredictionMonitor::with_detector(
            regression_reference(),
            "mmd",
            Thresholds::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DriftError::UnknownDetector(_)));
    }
}
