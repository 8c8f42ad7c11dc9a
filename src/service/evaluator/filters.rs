//! Filtering rules 1-5
//!
//! Each step consumes the surviving candidates of the previous one and records
//! why anything it drops was dropped.

use crate::model::{AllowedInjury, Certainty, EvaluatorConfig, InjuryMention, NoInjuryStatement};

use super::trace::ExclusionReason;
use super::{Candidate, ExclusionLog};

/// Result of the global suppression step
pub(super) enum Suppression<'a> {
    /// Evidence after the latest statement survives
    Kept(Vec<Candidate<'a>>),
    /// Nothing contradicts the statement; evaluation stops here
    Suppressed,
}

/// Rule 1: resolve candidate labels against the closed vocabulary
pub(super) fn admissible<'a>(
    mentions: &'a [InjuryMention],
    config: &EvaluatorConfig,
    log: &mut ExclusionLog,
) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::with_capacity(mentions.len());

    for (index, mention) in mentions.iter().enumerate() {
        let injury = mention.injury_candidate.as_deref().and_then(|label| {
            if config.require_exact_match {
                AllowedInjury::from_label(label)
            } else {
                AllowedInjury::from_label_normalized(label)
            }
        });

        match injury {
            Some(injury) => {
                log.resolve(index, injury);
                candidates.push(Candidate {
                    index,
                    mention,
                    injury,
                });
            }
            None => {
                tracing::debug!(
                    index = index,
                    candidate = ?mention.injury_candidate,
                    "Excluding inadmissible mention"
                );
                log.exclude_index(index, ExclusionReason::Inadmissible);
            }
        }
    }

    candidates
}

/// Rule 2: drop negated mentions
pub(super) fn drop_negated<'a>(
    candidates: Vec<Candidate<'a>>,
    log: &mut ExclusionLog,
) -> Vec<Candidate<'a>> {
    candidates
        .into_iter()
        .filter(|candidate| {
            if candidate.mention.is_negated {
                log.exclude(candidate, ExclusionReason::Negated);
                false
            } else {
                true
            }
        })
        .collect()
}

/// Rule 3: a global denial wins unless explicit, non-negated evidence starts
/// strictly after the latest statement ends
pub(super) fn apply_no_injury_statements<'a>(
    candidates: Vec<Candidate<'a>>,
    statements: &[NoInjuryStatement],
    log: &mut ExclusionLog,
) -> Suppression<'a> {
    let Some(latest_end) = statements.iter().map(|s| s.end_char).max() else {
        return Suppression::Kept(candidates);
    };

    let (after, dominated): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|candidate| {
        let mention = candidate.mention;
        mention.certainty == Certainty::Explicit
            && !mention.is_negated
            && mention.start_char > latest_end
    });

    for candidate in &dominated {
        log.exclude(candidate, ExclusionReason::SuppressedByNoInjuryStatement);
    }

    if after.is_empty() {
        tracing::debug!(
            latest_statement_end = latest_end,
            suppressed = dominated.len(),
            "No-injury statement suppresses all evidence"
        );
        return Suppression::Suppressed;
    }

    Suppression::Kept(after)
}

/// Rule 4: explicit evidence replaces implied/unclear evidence outright
pub(super) fn prefer_explicit<'a>(
    candidates: Vec<Candidate<'a>>,
    log: &mut ExclusionLog,
) -> Vec<Candidate<'a>> {
    let has_explicit = candidates
        .iter()
        .any(|c| c.mention.certainty == Certainty::Explicit);

    if !has_explicit {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|candidate| {
            if candidate.mention.certainty == Certainty::Explicit {
                true
            } else {
                log.exclude(candidate, ExclusionReason::WeakerCertainty);
                false
            }
        })
        .collect()
}

/// Rule 5: pain needs a body site, or explicit evidence that it arose at or after the fall
pub(super) fn strict_pain<'a>(
    candidates: Vec<Candidate<'a>>,
    log: &mut ExclusionLog,
) -> Vec<Candidate<'a>> {
    candidates
        .into_iter()
        .filter(|candidate| {
            if candidate.injury != AllowedInjury::Pain || pain_has_context(candidate.mention) {
                true
            } else {
                log.exclude(candidate, ExclusionReason::PainWithoutContext);
                false
            }
        })
        .collect()
}

fn pain_has_context(mention: &InjuryMention) -> bool {
    let has_site = mention
        .body_site
        .as_deref()
        .is_some_and(|site| !site.trim().is_empty());

    has_site
        || (mention.temporal_relation_to_fall.is_fall_related()
            && mention.certainty == Certainty::Explicit)
}
