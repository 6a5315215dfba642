use crate::analysis::rates::rollback_rate;
use crate::models::file_metric::FileMetric;
use crate::models::metrics::PsriResult;
use crate::models::pull_request::PullRequest;
use crate::models::weights::{WeightConfig, WeightDimension, PSRI_DIMENSIONS};

/// Cyclomatic complexity treated as the ceiling of a sane file. Fixed so that
/// persisted snapshots stay reproducible.
pub const MAX_SANE_COMPLEXITY: f64 = 100.0;
/// 90-day touch count treated as the ceiling of a sane file.
pub const MAX_SANE_CHANGE_FREQUENCY: f64 = 50.0;

/// Mean of `f` over `files`, 0 for an empty slice.
pub fn mean_of<F>(files: &[FileMetric], f: F) -> f64
where
    F: Fn(&FileMetric) -> f64,
{
    if files.is_empty() {
        return 0.0;
    }
    files.iter().map(f).sum::<f64>() / files.len() as f64
}

/// `value / ceiling`, clamped to [0, 1].
pub fn normalize(value: f64, ceiling: f64) -> f64 {
    (value / ceiling).clamp(0.0, 1.0)
}

/// Predictive Structural Risk Index.
///
/// All fields are `None` when both inputs are empty. Otherwise each dimension is
/// normalised to [0, 1] and combined with the weights named in `PSRI_DIMENSIONS`.
pub fn compute_psri(files: &[FileMetric], prs: &[PullRequest], weights: &WeightConfig) -> PsriResult {
    if files.is_empty() && prs.is_empty() {
        return PsriResult::empty();
    }

    let structural = normalize(
        mean_of(files, |f| f.cyclomatic_complexity),
        MAX_SANE_COMPLEXITY,
    );
    let change = normalize(
        mean_of(files, |f| f.change_frequency_90d),
        MAX_SANE_CHANGE_FREQUENCY,
    );
    let defect = rollback_rate(prs);

    let score = PSRI_DIMENSIONS
        .iter()
        .map(|dimension| {
            let value = match dimension {
                WeightDimension::Structural => structural,
                WeightDimension::Change => change,
                WeightDimension::Defect => defect,
                _ => 0.0,
            };
            weights.get(*dimension) * value
        })
        .sum();

    PsriResult {
        score: Some(score),
        structural: Some(structural),
        change: Some(change),
        defect: Some(defect),
    }
}
