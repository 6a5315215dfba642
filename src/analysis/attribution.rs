//! AI-heavy vs human-heavy cohort statistics.
//!
//! Unlike the scoring rates, an empty cohort reads as 0 here: in a side-by-side
//! comparison "no data" is itself the answer.

use crate::analysis::psri::mean_of;
use crate::analysis::rates::rate_or_zero;
use crate::models::attribution::*;
use crate::models::file_metric::FileMetric;
use crate::models::pull_request::PullRequest;

/// Files with more than this share of AI-attributed content are AI-heavy.
pub const AI_HEAVY_RATIO: f64 = 0.5;
/// Review rounds above this count mark a pull request as high-churn review.
pub const HIGH_REVIEW_ROUNDS: u32 = 3;

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn is_ai_heavy(file: &FileMetric) -> bool {
    file.ai_ratio_or_zero() > AI_HEAVY_RATIO
}

pub fn analyze_ai_attribution(files: &[FileMetric], prs: &[PullRequest]) -> AiAttribution {
    let (ai_files, human_files): (Vec<FileMetric>, Vec<FileMetric>) =
        files.iter().cloned().partition(is_ai_heavy);
    let (ai_prs, human_prs): (Vec<&PullRequest>, Vec<&PullRequest>) =
        prs.iter().partition(|pr| pr.ai_used);

    let ai_complexity = mean_of(&ai_files, |f| f.cyclomatic_complexity);
    let human_complexity = mean_of(&human_files, |f| f.cyclomatic_complexity);
    let ai_rollback = cohort_rate(&ai_prs, |pr| pr.rollback_flag);
    let human_rollback = cohort_rate(&human_prs, |pr| pr.rollback_flag);

    let complexity_verdict = if ai_complexity <= human_complexity {
        "AI code is less complex"
    } else {
        "Human code is less complex"
    };
    let stability_verdict = if ai_rollback <= human_rollback {
        "AI changes are at least as stable as human changes"
    } else {
        "Human changes are more stable than AI changes"
    };

    AiAttribution {
        summary: AttributionSummary {
            ai_file_count: ai_files.len(),
            human_file_count: human_files.len(),
            ai_pr_count: ai_prs.len(),
            human_pr_count: human_prs.len(),
        },
        complexity: ComplexityComparison {
            ai_avg_complexity: round_to(ai_complexity, 1),
            human_avg_complexity: round_to(human_complexity, 1),
            ai_avg_change_frequency: round_to(mean_of(&ai_files, |f| f.change_frequency_90d), 1),
            human_avg_change_frequency: round_to(mean_of(&human_files, |f| f.change_frequency_90d), 1),
            verdict: complexity_verdict.to_string(),
        },
        stability: StabilityComparison {
            ai_rollback_rate: round_to(ai_rollback, 3),
            human_rollback_rate: round_to(human_rollback, 3),
            verdict: stability_verdict.to_string(),
        },
        quality: QualityComparison {
            ai_major_revision_rate: round_to(cohort_rate(&ai_prs, |pr| pr.major_revision), 3),
            human_major_revision_rate: round_to(cohort_rate(&human_prs, |pr| pr.major_revision), 3),
            ai_avg_review_rounds: round_to(mean_review_rounds(&ai_prs), 1),
            human_avg_review_rounds: round_to(mean_review_rounds(&human_prs), 1),
        },
    }
}

pub fn analyze_failed_prs(prs: &[PullRequest]) -> FailedPrAttribution {
    let major_revisions = split_by_ai(prs, |pr| pr.major_revision);
    let rollbacks = split_by_ai(prs, |pr| pr.rollback_flag);
    let high_review_rounds = split_by_ai(prs, |pr| pr.review_rounds > HIGH_REVIEW_ROUNDS);

    FailedPrAttribution {
        total_failed: major_revisions.count + rollbacks.count,
        major_revisions,
        rollbacks,
        high_review_rounds,
    }
}

fn cohort_rate<F>(prs: &[&PullRequest], predicate: F) -> f64
where
    F: Fn(&PullRequest) -> bool,
{
    let matching = prs.iter().filter(|pr| predicate(pr)).count();
    rate_or_zero(matching, prs.len())
}

fn mean_review_rounds(prs: &[&PullRequest]) -> f64 {
    if prs.is_empty() {
        return 0.0;
    }
    prs.iter().map(|pr| pr.review_rounds as f64).sum::<f64>() / prs.len() as f64
}

fn split_by_ai<F>(prs: &[PullRequest], predicate: F) -> CohortCount
where
    F: Fn(&PullRequest) -> bool,
{
    prs.iter()
        .filter(|pr| predicate(pr))
        .fold(CohortCount::default(), |mut acc, pr| {
            acc.count += 1;
            if pr.ai_used {
                acc.ai += 1;
            } else {
                acc.human += 1;
            }
            acc
        })
}
