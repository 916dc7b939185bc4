//! Drift reports: per-feature results, aggregate status, JSON projection
//!
//! A [`DriftReport`] is created once by an engine after all per-column
//! results are computed and is read-only afterwards; every aggregate
//! (drift ratio, status, drifted features) is derived, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;

/// Which kind of drift a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriftType {
    Feature,
    Prediction,
    Concept,
}

impl DriftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftType::Feature => "FEATURE",
            DriftType::Prediction => "PREDICTION",
            DriftType::Concept => "CONCEPT",
        }
    }
}

/// Overall drift status, ordered so that `max` picks the worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriftStatus {
    Ok,
    Warning,
    Critical,
}

impl DriftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftStatus::Ok => "OK",
            DriftStatus::Warning => "WARNING",
            DriftStatus::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drift result for a single feature or metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDriftResult {
    /// Feature or metric name, unique within one report
    pub feature_name: String,
    pub has_drift: bool,
    pub score: f64,
    pub method: String,
    pub threshold: f64,
    pub p_value: Option<f64>,
    pub drift_type: DriftType,
}

impl FeatureDriftResult {
    fn to_value(&self) -> Value {
        json!({
            "feature_name": self.feature_name,
            "has_drift": self.has_drift,
            "score": self.score,
            "method": self.method,
            "threshold": self.threshold,
            "p_value": self.p_value,
            "drift_type": self.drift_type.as_str(),
        })
    }
}

/// Aggregated report of one drift check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub feature_results: Vec<FeatureDriftResult>,
    pub reference_size: usize,
    pub production_size: usize,
    pub timestamp: DateTime<Utc>,
    pub model_version: Option<String>,
}

impl DriftReport {
    pub fn new(
        feature_results: Vec<FeatureDriftResult>,
        reference_size: usize,
        production_size: usize,
    ) -> Self {
        Self {
            feature_results,
            reference_size,
            production_size,
            timestamp: Utc::now(),
            model_version: None,
        }
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    /// Whether any feature has drift
    pub fn has_drift(&self) -> bool {
        self.feature_results.iter().any(|r| r.has_drift)
    }

    /// Names of features with detected drift, in result order
    pub fn drifted_features(&self) -> Vec<&str> {
        self.feature_results
            .iter()
            .filter(|r| r.has_drift)
            .map(|r| r.feature_name.as_str())
            .collect()
    }

    /// Ratio of drifted features to total features, 0.0 when empty
    pub fn drift_ratio(&self) -> f64 {
        if self.feature_results.is_empty() {
            return 0.0;
        }
        self.drifted_features().len() as f64 / self.feature_results.len() as f64
    }

    /// Overall status: OK at ratio 0, WARNING below 0.5, CRITICAL at or
    /// above 0.5
    pub fn status(&self) -> DriftStatus {
        let ratio = self.drift_ratio();
        if ratio == 0.0 {
            DriftStatus::Ok
        } else if ratio < 0.5 {
            DriftStatus::Warning
        } else {
            DriftStatus::Critical
        }
    }

    /// Result for a specific feature or metric name
    pub fn feature_drift(&self, feature_name: &str) -> Option<&FeatureDriftResult> {
        self.feature_results
            .iter()
            .find(|r| r.feature_name == feature_name)
    }

    /// Human-readable summary block, for display only
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "=".repeat(50),
            "DRIFT REPORT".to_string(),
            "=".repeat(50),
            format!("Status: {}", self.status()),
            format!("Timestamp: {}", self.timestamp.to_rfc3339()),
            format!("Reference samples: {}", self.reference_size),
            format!("Production samples: {}", self.production_size),
            String::new(),
            format!("Features analyzed: {}", self.feature_results.len()),
            format!("Features with drift: {}", self.drifted_features().len()),
            format!("Drift ratio: {:.1}%", self.drift_ratio() * 100.0),
            String::new(),
        ];

        if self.has_drift() {
            lines.push("Drifted features:".to_string());
            for result in self.feature_results.iter().filter(|r| r.has_drift) {
                lines.push(format!(
                    "  - {}: {}={:.4} (threshold={})",
                    result.feature_name, result.method, result.score, result.threshold
                ));
            }
        }

        lines.push("=".repeat(50));
        lines.join("\n")
    }

    /// Canonical external representation, including derived fields
    pub fn to_value(&self) -> Value {
        json!({
            "status": self.status().as_str(),
            "timestamp": self.timestamp.to_rfc3339(),
            "reference_size": self.reference_size,
            "production_size": self.production_size,
            "model_version": self.model_version,
            "has_drift": self.has_drift(),
            "drift_ratio": self.drift_ratio(),
            "drifted_features": self.drifted_features(),
            "feature_results": self.feature_results.iter().map(|r| r.to_value()).collect::<Vec<_>>(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

/// Combined report across feature, prediction, and concept drift
///
/// Each sub-report is independently present or absent; absent reports
/// contribute nothing to the overall status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub feature: Option<DriftReport>,
    pub prediction: Option<DriftReport>,
    pub concept: Option<DriftReport>,
    pub model_version: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ComprehensiveReport {
    pub fn new(
        feature: Option<DriftReport>,
        prediction: Option<DriftReport>,
        concept: Option<DriftReport>,
    ) -> Self {
        Self {
            feature,
            prediction,
            concept,
            model_version: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    fn sub_reports(&self) -> [(DriftType, Option<&DriftReport>); 3] {
        [
            (DriftType::Feature, self.feature.as_ref()),
            (DriftType::Prediction, self.prediction.as_ref()),
            (DriftType::Concept, self.concept.as_ref()),
        ]
    }

    /// Worst status across present sub-reports
    pub fn status(&self) -> DriftStatus {
        self.sub_reports()
            .iter()
            .filter_map(|(_, r)| r.map(|r| r.status()))
            .max()
            .unwrap_or(DriftStatus::Ok)
    }

    pub fn has_drift(&self) -> bool {
        self.sub_reports()
            .iter()
            .any(|(_, r)| r.is_some_and(|r| r.has_drift()))
    }

    /// Drift types whose present sub-report detected drift
    pub fn drift_types_detected(&self) -> Vec<DriftType> {
        self.sub_reports()
            .iter()
            .filter(|(_, r)| r.is_some_and(|r| r.has_drift()))
            .map(|(t, _)| *t)
            .collect()
    }

    /// Human-readable summary covering each present sub-report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "=".repeat(50),
            "COMPREHENSIVE DRIFT REPORT".to_string(),
            "=".repeat(50),
            format!("Overall status: {}", self.status()),
        ];
        if let Some(version) = &self.model_version {
            lines.push(format!("Model version: {version}"));
        }
        for (drift_type, report) in self.sub_reports() {
            lines.push(String::new());
            match report {
                Some(report) => {
                    lines.push(format!("{} DRIFT: {}", drift_type.as_str(), report.status()));
                    lines.push(format!(
                        "  {}/{} drifted: {}",
                        report.drifted_features().len(),
                        report.feature_results.len(),
                        report.drifted_features().join(", ")
                    ));
                }
                None => lines.push(format!("{} DRIFT: not checked", drift_type.as_str())),
            }
        }
        lines.push("=".repeat(50));
        lines.join("\n")
    }

    pub fn to_value(&self) -> Value {
        json!({
            "status": self.status().as_str(),
            "timestamp": self.timestamp.to_rfc3339(),
            "model_version": self.model_version,
            "feature_drift": self.feature.as_ref().map(|r| r.to_value()),
            "prediction_drift": self.prediction.as_ref().map(|r| r.to_value()),
            "concept_drift": self.concept.as_ref().map(|r| r.to_value()),
            "drift_types_detected": self.drift_types_detected().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}
