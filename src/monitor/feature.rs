//! Feature drift monitoring

use std::collections::HashMap;

use tracing::debug;

use crate::data::Dataset;
use crate::detectors::{detector_for_kind, Detector, Thresholds};
use crate::error::{DriftError, Result};
use crate::report::{DriftReport, DriftType, FeatureDriftResult};

/// Monitor comparing production feature distributions against a
/// reference dataset
///
/// One detector is resolved per feature at construction from the column's
/// data kind: numeric columns get PSI, categorical columns get
/// chi-squared. `check` is `&self` and safe to call concurrently;
/// `add_feature`/`remove_feature` mutate the monitor and need external
/// synchronization if shared.
#[derive(Debug)]
pub struct FeatureMonitor {
    reference: Dataset,
    features: Vec<String>,
    thresholds: Thresholds,
    detectors: HashMap<String, Box<dyn Detector>>,
}

impl FeatureMonitor {
    /// Monitor all columns of the reference dataset
    pub fn new(reference: Dataset, thresholds: Thresholds) -> Result<Self> {
        let features = reference.column_names();
        Self::with_features(reference, features, thresholds)
    }

    /// Monitor an explicit subset of columns, in the given order
    pub fn with_features(
        reference: Dataset,
        features: Vec<String>,
        thresholds: Thresholds,
    ) -> Result<Self> {
        if reference.is_empty() {
            return Err(DriftError::EmptyDataset(
                "reference data cannot be empty".to_string(),
            ));
        }

        let mut detectors = HashMap::new();
        for feature in &features {
            let column = reference.column(feature).ok_or_else(|| {
                DriftError::UnknownFeature(format!("'{feature}' not found in reference data"))
            })?;
            detectors.insert(
                feature.clone(),
                detector_for_kind(column.kind(), &thresholds),
            );
        }

        Ok(Self {
            reference,
            features,
            thresholds,
            detectors,
        })
    }

    /// Check production data for drift against the reference
    ///
    /// Runs each monitored feature's detector in declared order and
    /// aggregates the results into one report.
    pub fn check(&self, production: &Dataset) -> Result<DriftReport> {
        self.validate_production(production)?;

        debug!(
            features = self.features.len(),
            production_rows = production.n_rows(),
            "running feature drift check"
        );

        let mut feature_results = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            // presence validated above
            let ref_column = self.reference.column(feature).ok_or_else(|| {
                DriftError::UnknownFeature(format!("'{feature}' not found in reference data"))
            })?;
            let prod_column = production.column(feature).ok_or_else(|| {
                DriftError::UnknownFeature(format!("'{feature}' not found in production data"))
            })?;

            let detector = &self.detectors[feature];
            let result = detector.detect(ref_column, prod_column)?;

            feature_results.push(FeatureDriftResult {
                feature_name: feature.clone(),
                has_drift: result.has_drift,
                score: result.score,
                method: result.method,
                threshold: result.threshold,
                p_value: result.p_value,
                drift_type: DriftType::Feature,
            });
        }

        Ok(DriftReport::new(
            feature_results,
            self.reference.n_rows(),
            production.n_rows(),
        ))
    }

    fn validate_production(&self, production: &Dataset) -> Result<()> {
        if production.is_empty() {
            return Err(DriftError::EmptyDataset(
                "production data cannot be empty".to_string(),
            ));
        }
        let missing: Vec<&str> = self
            .features
            .iter()
            .filter(|f| !production.has_column(f))
            .map(|f| f.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(DriftError::UnknownFeature(format!(
                "missing in production data: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Start monitoring an additional feature; no-op if already monitored
    pub fn add_feature(&mut self, feature: &str) -> Result<()> {
        if self.features.iter().any(|f| f == feature) {
            return Ok(());
        }
        let column = self.reference.column(feature).ok_or_else(|| {
            DriftError::UnknownFeature(format!("'{feature}' not found in reference data"))
        })?;
        self.detectors.insert(
            feature.to_string(),
            detector_for_kind(column.kind(), &self.thresholds),
        );
        self.features.push(feature.to_string());
        Ok(())
    }

    /// Stop monitoring a feature; no-op if it was not monitored
    pub fn remove_feature(&mut self, feature: &str) {
        self.features.retain(|f| f != feature);
        self.detectors.remove(feature);
    }

    /// Names of the monitored features, in declared order
    pub fn monitored_features(&self) -> &[String] {
        &self.features
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn reference() -> Dataset {
        Dataset::from_columns([
            (
                "age",
                Column::Numeric((0..100).map(|i| 20.0 + (i % 40) as f64).collect()),
            ),
            (
                "segment",
                Column::from_labels((0..100).map(|i| if i % 3 == 0 { "a" } else { "b" })),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_monitors_all_columns_by_default() {
        let monitor = FeatureMonitor::new(reference(), Thresholds::default()).unwrap();
        assert_eq!(monitor.monitored_features(), &["age", "segment"]);
    }

    #[test]
    fn test_empty_reference_rejected() {
        let err = FeatureMonitor::new(Dataset::new(), Thresholds::default()).unwrap_err();
        assert!(matches!(err, DriftError::EmptyDataset(_)));
    }

    #[test]
    fn test_unknown_feature_at_construction() {
        let err = FeatureMonitor::with_features(
            reference(),
            vec!["age".to_string(), "income".to_string()],
            Thresholds::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("income"));
    }

    #[test]
    fn test_check_no_drift_on_same_data() {
        let monitor = FeatureMonitor::new(reference(), Thresholds::default()).unwrap();
        let report = monitor.check(&reference()).unwrap();
        assert!(!report.has_drift());
        assert_eq!(report.feature_results.len(), 2);
        assert_eq!(report.reference_size, 100);
        assert_eq!(report.production_size, 100);
        assert!(report
            .feature_results
            .iter()
            .all(|r| r.drift_type == DriftType::Feature));
    }

    #[test]
    fn test_check_selects_method_per_kind() {
        let monitor = FeatureMonitor::new(reference(), Thresholds::default()).unwrap();
        let report = monitor.check(&reference()).unwrap();
        assert_eq!(report.feature_drift("age").unwrap().method, "psi");
        assert_eq!(report.feature_drift("segment").unwrap().method, "chi_squared");
    }

    #[test]
    fn test_check_empty_production_rejected() {
        let monitor = FeatureMonitor::new(reference(), Thresholds::default()).unwrap();
        let err = monitor.check(&Dataset::new()).unwrap_err();
        assert!(matches!(err, DriftError::EmptyDataset(_)));
    }

    #[test]
    fn test_check_reports_all_missing_features() {
        let monitor = FeatureMonitor::new(reference(), Thresholds::default()).unwrap();
        let production =
            Dataset::from_columns([("other", Column::Numeric(vec![1.0, 2.0]))]).unwrap();
        let err = monitor.check(&production).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("age"));
        assert!(message.contains("segment"));
    }

    #[test]
    fn test_add_and_remove_feature() {
        let mut monitor = FeatureMonitor::with_features(
            reference(),
            vec!["age".to_string()],
            Thresholds::default(),
        )
        .unwrap();

        monitor.add_feature("segment").unwrap();
        assert_eq!(monitor.monitored_features(), &["age", "segment"]);

        // duplicate add is a no-op
        monitor.add_feature("segment").unwrap();
        assert_eq!(monitor.monitored_features().len(), 2);

        assert!(monitor.add_feature("income").is_err());

        monitor.remove_feature("age");
        assert_eq!(monitor.monitored_features(), &["segment"]);
        // removing an unmonitored feature is a no-op
        monitor.remove_feature("age");
        assert_eq!(monitor.monitored_features().len(), 1);
    }
}
