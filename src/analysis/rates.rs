use crate::models::pull_request::PullRequest;

/// `numerator / denominator`, or `None` when there is nothing to divide by.
pub fn safe_rate(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64)
}

/// Like `safe_rate` but an empty denominator reads as 0.
pub fn rate_or_zero(numerator: usize, denominator: usize) -> f64 {
    safe_rate(numerator, denominator).unwrap_or(0.0)
}

/// Fraction of AI-assisted pull requests merged without a major revision.
/// `None` when no pull request is flagged `ai_used`.
pub fn ai_success_rate(prs: &[PullRequest]) -> Option<f64> {
    ai_rate_where(prs, |pr| !pr.major_revision)
}

/// Fraction of AI-assisted pull requests that were never rolled back.
pub fn ai_stable_rate(prs: &[PullRequest]) -> Option<f64> {
    ai_rate_where(prs, |pr| !pr.rollback_flag)
}

/// Fraction of all pull requests that were rolled back, 0 for an empty set.
pub fn rollback_rate(prs: &[PullRequest]) -> f64 {
    let rolled_back = prs.iter().filter(|pr| pr.rollback_flag).count();
    rate_or_zero(rolled_back, prs.len())
}

fn ai_rate_where<F>(prs: &[PullRequest], predicate: F) -> Option<f64>
where
    F: Fn(&PullRequest) -> bool,
{
    let ai_prs: Vec<&PullRequest> = prs.iter().filter(|pr| pr.ai_used).collect();
    let matching = ai_prs.iter().filter(|pr| predicate(pr)).count();
    safe_rate(matching, ai_prs.len())
}
