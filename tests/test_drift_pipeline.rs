//! Integration test: Full drift pipeline (monitor -> check -> report)

use driftguard::detectors::Thresholds;
use driftguard::monitor::{
    ConceptMonitor, DriftSuite, FeatureMonitor, LabeledOutcomes, PredictionMonitor, Predictions,
    SuiteInputs, Task,
};
use driftguard::prelude::{Column, Dataset, DriftError, DriftStatus, DriftType};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Normal;

fn sample_normal(mean: f64, std: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dist = Normal::new(mean, std).unwrap();
    use rand::distributions::Distribution;
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

fn categorical_column(weights: &[(&str, usize)]) -> Column {
    let mut labels = Vec::new();
    for (label, count) in weights {
        labels.extend(std::iter::repeat(*label).take(*count));
    }
    Column::from_labels(labels)
}

#[test]
fn test_stable_numeric_feature_passes() {
    let reference = Dataset::from_columns(vec![(
        "age",
        Column::Numeric(sample_normal(35.0, 10.0, 1000, 1)),
    )])
    .unwrap();
    let production = Dataset::from_columns(vec![(
        "age",
        Column::Numeric(sample_normal(35.0, 10.0, 500, 2)),
    )])
    .unwrap();

    let monitor = FeatureMonitor::new(reference, Thresholds::default()).unwrap();
    let report = monitor.check(&production).unwrap();

    assert!(!report.has_drift());
    assert_eq!(report.status(), DriftStatus::Ok);
    assert_eq!(report.drift_ratio(), 0.0);
    assert!(report.drifted_features().is_empty());
}

#[test]
fn test_shifted_numeric_feature_flags_drift() {
    let reference = Dataset::from_columns(vec![(
        "age",
        Column::Numeric(sample_normal(35.0, 10.0, 1000, 3)),
    )])
    .unwrap();
    // two reference standard deviations to the right
    let production = Dataset::from_columns(vec![(
        "age",
        Column::Numeric(sample_normal(55.0, 10.0, 500, 4)),
    )])
    .unwrap();

    let monitor = FeatureMonitor::new(reference, Thresholds::default()).unwrap();
    let report = monitor.check(&production).unwrap();

    assert!(report.has_drift());
    let age = report.feature_drift("age").unwrap();
    assert_eq!(age.method, "psi");
    assert!(age.score >= 0.2, "psi {} should exceed threshold", age.score);
    assert_eq!(report.status(), DriftStatus::Critical);
}

#[test]
fn test_shifted_categorical_feature_flags_drift() {
    let reference = Dataset::from_columns(vec![(
        "plan",
        categorical_column(&[("A", 700), ("B", 200), ("C", 100)]),
    )])
    .unwrap();
    let production = Dataset::from_columns(vec![(
        "plan",
        categorical_column(&[("A", 200), ("B", 500), ("C", 300)]),
    )])
    .unwrap();

    let monitor = FeatureMonitor::new(reference, Thresholds::default()).unwrap();
    let report = monitor.check(&production).unwrap();

    let plan = report.feature_drift("plan").unwrap();
    assert_eq!(plan.method, "chi_squared");
    assert!(plan.has_drift);
    assert!(plan.p_value.unwrap() < 0.05);
}

#[test]
fn test_mixed_dataset_partial_drift_is_warning() {
    let reference = Dataset::from_columns(vec![
        ("stable_a", Column::Numeric(sample_normal(0.0, 1.0, 800, 5))),
        ("stable_b", Column::Numeric(sample_normal(100.0, 5.0, 800, 6))),
        ("shifted", Column::Numeric(sample_normal(10.0, 2.0, 800, 7))),
    ])
    .unwrap();
    let production = Dataset::from_columns(vec![
        ("stable_a", Column::Numeric(sample_normal(0.0, 1.0, 800, 8))),
        ("stable_b", Column::Numeric(sample_normal(100.0, 5.0, 800, 9))),
        ("shifted", Column::Numeric(sample_normal(20.0, 2.0, 800, 10))),
    ])
    .unwrap();

    let monitor = FeatureMonitor::new(reference, Thresholds::default()).unwrap();
    let report = monitor.check(&production).unwrap();

    // 1 of 3 drifted: ratio below 0.5
    assert_eq!(report.drifted_features(), vec!["shifted"]);
    assert_eq!(report.status(), DriftStatus::Warning);
}

#[test]
fn test_missing_production_column_is_one_error() {
    let reference = Dataset::from_columns(vec![
        ("a", Column::Numeric(vec![1.0, 2.0, 3.0])),
        ("b", Column::Numeric(vec![4.0, 5.0, 6.0])),
    ])
    .unwrap();
    let production = Dataset::from_columns(vec![("c", Column::Numeric(vec![1.0, 2.0]))]).unwrap();

    let monitor = FeatureMonitor::new(reference, Thresholds::default()).unwrap();
    let err = monitor.check(&production).unwrap_err();

    match err {
        DriftError::UnknownFeature(msg) => {
            assert!(msg.contains("a") && msg.contains("b"), "got: {msg}");
        }
        other => panic!("expected UnknownFeature, got {other:?}"),
    }
}

#[test]
fn test_prediction_drift_classification_scores() {
    let n = 600;
    let calibrated: Vec<f64> = sample_normal(0.5, 0.1, n, 11)
        .into_iter()
        .map(|p| p.clamp(0.0, 1.0))
        .collect();
    let confident: Vec<f64> = sample_normal(0.9, 0.05, n, 12)
        .into_iter()
        .map(|p| p.clamp(0.0, 1.0))
        .collect();

    let to_scores = |probs: &[f64]| {
        let mut data = Vec::with_capacity(probs.len() * 2);
        for &p in probs {
            data.push(1.0 - p);
            data.push(p);
        }
        Array2::from_shape_vec((probs.len(), 2), data).unwrap()
    };

    let reference = Predictions::from_scores(to_scores(&calibrated));
    let production = Predictions::from_scores(to_scores(&confident));

    let monitor = PredictionMonitor::new(reference, Thresholds::default()).unwrap();
    assert_eq!(monitor.task(), Task::Classification);

    let report = monitor.check(&production).unwrap();
    assert!(report.has_drift());
    for result in &report.feature_results {
        assert_eq!(result.drift_type, DriftType::Prediction);
    }
}

#[test]
fn test_concept_drift_on_degraded_accuracy() {
    let monitor = ConceptMonitor::new(Task::Classification);

    let n = 400;
    let label_at = |i: usize| if i % 2 == 0 { 1.0 } else { 0.0 };
    let y_true: Array1<f64> = Array1::from_iter((0..n).map(label_at));
    // reference period: 95% correct; production period: 75% correct
    let flip = |every: usize| {
        Array1::from_iter((0..n).map(|i| {
            let label = label_at(i);
            if i % every == 0 {
                1.0 - label
            } else {
                label
            }
        }))
    };
    let y_pred_ref = flip(20);
    let y_pred_prod = flip(4);

    let (report, details) = monitor
        .check_detailed(&y_true, &y_pred_ref, &y_true, &y_pred_prod)
        .unwrap();

    let accuracy = report.feature_drift("accuracy").unwrap();
    assert!(accuracy.has_drift);
    assert_eq!(accuracy.drift_type, DriftType::Concept);
    assert!((details[0].reference_value - 0.95).abs() < 1e-12);
    assert!((details[0].production_value - 0.75).abs() < 1e-12);
}

#[test]
fn test_suite_end_to_end() {
    let reference = Dataset::from_columns(vec![(
        "income",
        Column::Numeric(sample_normal(50_000.0, 12_000.0, 500, 13)),
    )])
    .unwrap();
    let ref_preds = Predictions::Regression(Array1::from_vec(sample_normal(0.3, 0.05, 500, 14)));

    let suite = DriftSuite::builder(reference)
        .with_task(Task::Regression)
        .with_reference_predictions(ref_preds)
        .with_model_version("churn-v3")
        .build()
        .unwrap();

    // stable features, drifted predictions, stable performance
    let production = Dataset::from_columns(vec![(
        "income",
        Column::Numeric(sample_normal(50_000.0, 12_000.0, 500, 15)),
    )])
    .unwrap();
    let prod_preds = Predictions::Regression(Array1::from_vec(sample_normal(0.7, 0.05, 500, 16)));
    let y_true = Array1::from_vec(sample_normal(0.3, 0.05, 200, 17));

    let report = suite
        .check(SuiteInputs {
            production_data: Some(&production),
            production_predictions: Some(&prod_preds),
            outcomes: Some(LabeledOutcomes {
                y_true_ref: &y_true,
                y_pred_ref: &y_true,
                y_true_prod: &y_true,
                y_pred_prod: &y_true,
            }),
        })
        .unwrap();

    assert_eq!(report.drift_types_detected(), vec![DriftType::Prediction]);
    assert_eq!(report.model_version.as_deref(), Some("churn-v3"));
    assert!(!report.feature.as_ref().unwrap().has_drift());
    assert!(!report.concept.as_ref().unwrap().has_drift());
    assert_eq!(report.status(), DriftStatus::Critical);
}
