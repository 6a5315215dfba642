//! Decision rule table.
//!
//! Rules are data: adding one means appending to `DECISION_RULES`, the
//! evaluator's control flow does not change.

use crate::analysis::tdi::TDI_CRITICAL_THRESHOLD;
use crate::models::decision::{DecisionCategory, DecisionLevel};

/// Latest scores a rule is evaluated against. `None` never satisfies a
/// numeric comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuleInputs {
    pub ai_success_rate: Option<f64>,
    pub psri_score: Option<f64>,
    pub hotspot_files: usize,
    pub tdi: Option<f64>,
}

pub struct DecisionRule {
    pub title: &'static str,
    pub description: &'static str,
    pub level: DecisionLevel,
    pub category: DecisionCategory,
    pub priority: i64,
    pub predicate: fn(&RuleInputs) -> bool,
}

impl std::fmt::Debug for DecisionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionRule")
            .field("title", &self.title)
            .field("level", &self.level)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .finish()
    }
}

fn above(value: Option<f64>, threshold: f64) -> bool {
    matches!(value, Some(v) if v > threshold)
}

fn below(value: Option<f64>, threshold: f64) -> bool {
    matches!(value, Some(v) if v < threshold)
}

pub static DECISION_RULES: [DecisionRule; 5] = [
    DecisionRule {
        title: "Expand AI usage",
        description: "AI-assisted pull requests rarely need major rework and structural risk is low. Consider extending AI assistance to more of the codebase.",
        level: DecisionLevel::Info,
        category: DecisionCategory::AiUsage,
        priority: 2,
        predicate: |i| above(i.ai_success_rate, 0.9) && below(i.psri_score, 0.3),
    },
    DecisionRule {
        title: "Review AI tool configuration",
        description: "Fewer than half of AI-assisted pull requests merge without a major revision. Revisit prompts, context and tool settings.",
        level: DecisionLevel::Warning,
        category: DecisionCategory::AiUsage,
        priority: 4,
        predicate: |i| below(i.ai_success_rate, 0.5),
    },
    DecisionRule {
        title: "Limit AI auto-generation",
        description: "Structural risk index is high. Restrict unattended AI generation in risky areas until complexity and rollbacks come down.",
        level: DecisionLevel::Warning,
        category: DecisionCategory::Risk,
        priority: 5,
        predicate: |i| above(i.psri_score, 0.6),
    },
    DecisionRule {
        title: "Code review sprint",
        description: "More than 10 files are both complex and frequently changed. Schedule focused reviews of these hotspots.",
        level: DecisionLevel::Warning,
        category: DecisionCategory::CodeQuality,
        priority: 3,
        predicate: |i| i.hotspot_files > 10,
    },
    DecisionRule {
        title: "Tech debt reduction sprint",
        description: "Technical debt index is critical. Dedicate a sprint to simplifying and consolidating the worst files.",
        level: DecisionLevel::Critical,
        category: DecisionCategory::TechDebt,
        priority: 5,
        predicate: |i| above(i.tdi, TDI_CRITICAL_THRESHOLD),
    },
];

/// Rules whose predicate holds, in table order.
pub fn matching_rules<'a>(rules: &'a [DecisionRule], inputs: &RuleInputs) -> Vec<&'a DecisionRule> {
    rules.iter().filter(|rule| (rule.predicate)(inputs)).collect()
}
