//! Drift monitoring engines
//!
//! One engine per drift type: [`FeatureMonitor`] for input features,
//! [`PredictionMonitor`] for model outputs, [`ConceptMonitor`] for
//! performance degradation, plus the [`DriftSuite`] orchestrator.

pub mod concept;
pub mod feature;
pub mod prediction;
pub mod suite;

pub use concept::{ConceptMonitor, DegradationMode, PerformanceComparison};
pub use feature::FeatureMonitor;
pub use prediction::{PredictionMonitor, Predictions, Task};
pub use suite::{DriftSuite, DriftSuiteBuilder, LabeledOutcomes, SuiteInputs};
