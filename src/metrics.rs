//! Performance metrics for concept drift monitoring
//!
//! Classification metrics follow the binary positive-label convention
//! (label == 1). Regression metrics use the usual least-squares
//! definitions with documented zero-denominator fallbacks.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::DriftError;
use crate::stats;

/// A performance metric tracked by the concept drift monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    F1,
    AucRoc,
    Mae,
    Mse,
    Rmse,
    R2,
    Mape,
}

/// All supported metrics, in canonical listing order
pub const ALL_METRICS: [Metric; 10] = [
    Metric::Accuracy,
    Metric::Precision,
    Metric::Recall,
    Metric::F1,
    Metric::AucRoc,
    Metric::Mae,
    Metric::Mse,
    Metric::Rmse,
    Metric::R2,
    Metric::Mape,
];

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::F1 => "f1",
            Metric::AucRoc => "auc_roc",
            Metric::Mae => "mae",
            Metric::Mse => "mse",
            Metric::Rmse => "rmse",
            Metric::R2 => "r2",
            Metric::Mape => "mape",
        }
    }

    /// Whether larger values mean better model performance
    pub fn higher_is_better(&self) -> bool {
        matches!(
            self,
            Metric::Accuracy
                | Metric::Precision
                | Metric::Recall
                | Metric::F1
                | Metric::AucRoc
                | Metric::R2
        )
    }

    /// Default degradation threshold for this metric
    pub fn default_threshold(&self) -> f64 {
        match self {
            Metric::Accuracy
            | Metric::Precision
            | Metric::Recall
            | Metric::F1
            | Metric::AucRoc => 0.05,
            Metric::Mae | Metric::Mse | Metric::Rmse | Metric::R2 | Metric::Mape => 0.1,
        }
    }

    /// Compute this metric over matched true/predicted arrays
    pub fn compute(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        match self {
            Metric::Accuracy => {
                let correct = y_true
                    .iter()
                    .zip(y_pred.iter())
                    .filter(|(t, p)| t == p)
                    .count();
                correct as f64 / y_true.len() as f64
            }
            Metric::Precision => precision(y_true, y_pred),
            Metric::Recall => recall(y_true, y_pred),
            Metric::F1 => {
                let p = precision(y_true, y_pred);
                let r = recall(y_true, y_pred);
                if p + r == 0.0 {
                    0.0
                } else {
                    2.0 * p * r / (p + r)
                }
            }
            Metric::AucRoc => {
                let positives: Vec<f64> = y_true
                    .iter()
                    .zip(y_pred.iter())
                    .filter(|(t, _)| **t == 1.0)
                    .map(|(_, p)| *p)
                    .collect();
                let negatives: Vec<f64> = y_true
                    .iter()
                    .zip(y_pred.iter())
                    .filter(|(t, _)| **t == 0.0)
                    .map(|(_, p)| *p)
                    .collect();
                stats::mann_whitney_auc(&positives, &negatives)
            }
            Metric::Mae => {
                y_true
                    .iter()
                    .zip(y_pred.iter())
                    .map(|(t, p)| (t - p).abs())
                    .sum::<f64>()
                    / y_true.len() as f64
            }
            Metric::Mse => mse(y_true, y_pred),
            Metric::Rmse => mse(y_true, y_pred).sqrt(),
            Metric::R2 => {
                let ss_res: f64 = y_true
                    .iter()
                    .zip(y_pred.iter())
                    .map(|(t, p)| (t - p).powi(2))
                    .sum();
                let mean = y_true.sum() / y_true.len() as f64;
                let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
                if ss_tot == 0.0 {
                    if ss_res == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    1.0 - ss_res / ss_tot
                }
            }
            Metric::Mape => {
                let terms: Vec<f64> = y_true
                    .iter()
                    .zip(y_pred.iter())
                    .filter(|(t, _)| **t != 0.0)
                    .map(|(t, p)| ((t - p) / t).abs())
                    .collect();
                if terms.is_empty() {
                    0.0
                } else {
                    terms.iter().sum::<f64>() / terms.len() as f64
                }
            }
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_METRICS
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let available: Vec<&str> = ALL_METRICS.iter().map(|m| m.as_str()).collect();
                DriftError::UnknownMetric(format!(
                    "'{}'. Available: {}",
                    s,
                    available.join(", ")
                ))
            })
    }
}

fn mse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

fn precision(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let tp = count_pairs(y_true, y_pred, 1.0, 1.0);
    let fp = count_pairs(y_true, y_pred, 0.0, 1.0);
    if tp + fp == 0.0 {
        0.0
    } else {
        tp / (tp + fp)
    }
}

fn recall(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let tp = count_pairs(y_true, y_pred, 1.0, 1.0);
    let fn_ = count_pairs(y_true, y_pred, 1.0, 0.0);
    if tp + fn_ == 0.0 {
        0.0
    } else {
        tp / (tp + fn_)
    }
}

fn count_pairs(y_true: &Array1<f64>, y_pred: &Array1<f64>, t: f64, p: f64) -> f64 {
    y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(yt, yp)| **yt == t && **yp == p)
        .count() as f64
}
