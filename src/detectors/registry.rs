//! Detector selection by column kind or explicit name

use crate::data::ColumnKind;
use crate::detectors::{
    AndersonDarlingDetector, ChiSquaredDetector, CramerVonMisesDetector, Detector,
    FrequencyPsiDetector, JensenShannonDetector, KsDetector, PsiDetector, Thresholds,
    WassersteinDetector,
};
use crate::error::{DriftError, Result};

/// Names accepted by [`detector_by_name`]
pub const DETECTOR_NAMES: [&str; 8] = [
    "psi",
    "ks",
    "wasserstein",
    "chi2",
    "frequency_psi",
    "jensen_shannon",
    "anderson_darling",
    "cramer_von_mises",
];

/// Default detector for a column kind
///
/// Numeric columns use PSI, categorical columns use chi-squared.
pub fn detector_for_kind(kind: ColumnKind, thresholds: &Thresholds) -> Box<dyn Detector> {
    match kind {
        ColumnKind::Numeric => Box::new(PsiDetector::new(thresholds.get_or("psi", 0.2))),
        ColumnKind::Categorical => Box::new(ChiSquaredDetector::new(
            thresholds.get_or("chi2_pvalue", 0.05),
        )),
    }
}

/// Detector by explicit name
///
/// Fails with [`DriftError::UnknownDetector`] listing the available names.
pub fn detector_by_name(name: &str, thresholds: &Thresholds) -> Result<Box<dyn Detector>> {
    match name {
        "psi" => Ok(Box::new(PsiDetector::new(thresholds.get_or("psi", 0.2)))),
        "ks" => Ok(Box::new(KsDetector::new(
            thresholds.get_or("ks_pvalue", 0.05),
        ))),
        "wasserstein" => Ok(Box::new(WassersteinDetector::new(
            thresholds.get_or("wasserstein", 0.1),
        ))),
        "chi2" => Ok(Box::new(ChiSquaredDetector::new(
            thresholds.get_or("chi2_pvalue", 0.05),
        ))),
        "frequency_psi" => Ok(Box::new(FrequencyPsiDetector::new(
            thresholds.get_or("psi", 0.2),
        ))),
        "jensen_shannon" => Ok(Box::new(JensenShannonDetector::new(
            thresholds.get_or("jensen_shannon", 0.1),
        ))),
        "anderson_darling" => Ok(Box::new(AndersonDarlingDetector::new(
            thresholds.get_or("anderson_darling_pvalue", 0.05),
        ))),
        "cramer_von_mises" => Ok(Box::new(CramerVonMisesDetector::new(
            thresholds.get_or("cramer_von_mises_pvalue", 0.05),
        ))),
        other => Err(DriftError::UnknownDetector(format!(
            "'{}'. Available: {}",
            other,
            DETECTOR_NAMES.join(", ")
        ))),
    }
}
