//! Per-mention audit trail for an evaluation

use serde::Serialize;

use crate::model::{AllowedInjury, FinalInjury};

/// Rule that removed a mention from the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Rule 1: no candidate label, or one outside the allowed vocabulary
    Inadmissible,
    /// Rule 2
    Negated,
    /// Rule 3: dominated by a later global "no injuries" statement
    SuppressedByNoInjuryStatement,
    /// Rule 4: implied/unclear while explicit evidence exists
    WeakerCertainty,
    /// Rule 5
    PainWithoutContext,
    /// Rule 6: another mention represents the same label
    Duplicate { kept_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Included,
    Excluded(ExclusionReason),
}

/// What happened to one input mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionDecision {
    /// Position in `Layer1Evidence::injury_mentions`
    pub index: usize,
    pub text: String,
    /// Resolved label, if the mention was admissible
    pub matched_injury: Option<AllowedInjury>,
    pub verdict: Verdict,
}

/// Final injuries together with the decision for every input mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationOutcome {
    pub injuries: Vec<FinalInjury>,
    pub decisions: Vec<MentionDecision>,
}

impl EvaluationOutcome {
    /// Decision for the mention at `index`
    pub fn decision(&self, index: usize) -> Option<&MentionDecision> {
        self.decisions.get(index)
    }

    /// Indices of mentions excluded for `reason`
    pub fn excluded_by(&self, reason: ExclusionReason) -> Vec<usize> {
        self.decisions
            .iter()
            .filter(|d| d.verdict == Verdict::Excluded(reason))
            .map(|d| d.index)
            .collect()
    }
}
