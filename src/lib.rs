//! DriftGuard - Drift detection for machine learning models in production
//!
//! This crate compares a reference period (typically training or
//! validation data) against a production period and reports three kinds
//! of drift with a clear separation between them:
//! - Feature drift: input distributions shifted
//! - Prediction drift: model output distributions shifted
//! - Concept drift: model performance degraded on labeled data
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Column and dataset containers with missing-value handling
//! - [`detectors`] - Statistical drift tests (PSI, KS, chi-squared, ...)
//! - [`monitor`] - Feature, prediction, and concept drift engines
//! - [`report`] - Status-classified drift reports and JSON projection
//!
//! ## Supporting
//! - [`metrics`] - Performance metrics for concept drift
//! - [`stats`] - Two-sample statistics shared by the detectors
//! - [`explain`] - Statistical explanation of distribution shifts
//!
//! # Example
//!
//! ```no_run
//! use driftguard::prelude::*;
//!
//! # fn demo(reference: Dataset, production: Dataset) -> driftguard::Result<()> {
//! let monitor = FeatureMonitor::new(reference, Thresholds::default())?;
//! let report = monitor.check(&production)?;
//! if report.has_drift() {
//!     println!("{}", report.summary());
//! }
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Core drift detection
pub mod data;
pub mod detectors;
pub mod monitor;
pub mod report;

// Supporting modules
pub mod explain;
pub mod metrics;
pub mod stats;

pub use error::{DriftError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{DriftError, Result};

    // Data containers
    pub use crate::data::{Column, ColumnKind, Dataset};

    // Detectors
    pub use crate::detectors::{DetectionResult, Detector, Thresholds};

    // Monitors
    pub use crate::monitor::{
        ConceptMonitor, DegradationMode, DriftSuite, FeatureMonitor, LabeledOutcomes,
        PredictionMonitor, Predictions, SuiteInputs, Task,
    };

    // Reports
    pub use crate::report::{ComprehensiveReport, DriftReport, DriftStatus, DriftType};

    // Metrics
    pub use crate::metrics::Metric;
}
