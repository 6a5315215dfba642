use crate::analysis::psri::{mean_of, normalize, MAX_SANE_CHANGE_FREQUENCY, MAX_SANE_COMPLEXITY};
use crate::models::file_metric::FileMetric;

/// Author count at which ownership is considered fully diffused.
pub const MAX_SANE_AUTHOR_COUNT: f64 = 10.0;

pub const TDI_COMPLEXITY_WEIGHT: f64 = 0.40;
pub const TDI_CHURN_WEIGHT: f64 = 0.35;
pub const TDI_OWNERSHIP_WEIGHT: f64 = 0.25;

/// Scores strictly above this are reported as critical.
pub const TDI_CRITICAL_THRESHOLD: f64 = 0.7;

/// Technical Debt Index in [0, 1]: complexity, churn and ownership spread,
/// each mean-normalised like PSRI, then weighted. `None` without files.
pub fn compute_tdi(files: &[FileMetric]) -> Option<f64> {
    if files.is_empty() {
        return None;
    }

    let complexity = normalize(mean_of(files, |f| f.cyclomatic_complexity), MAX_SANE_COMPLEXITY);
    let churn = normalize(mean_of(files, |f| f.change_frequency_90d), MAX_SANE_CHANGE_FREQUENCY);
    let ownership = normalize(mean_of(files, |f| f.author_count as f64), MAX_SANE_AUTHOR_COUNT);

    Some(
        TDI_COMPLEXITY_WEIGHT * complexity
            + TDI_CHURN_WEIGHT * churn
            + TDI_OWNERSHIP_WEIGHT * ownership,
    )
}
