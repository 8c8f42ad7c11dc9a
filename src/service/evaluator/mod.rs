//! Deterministic Layer 2 evaluator
//!
//! Turns a Layer 1 evidence bundle into the final injury list by applying a
//! fixed sequence of rules:
//!
//! 1. admissibility (label must be in the allowed vocabulary)
//! 2. negation
//! 3. global suppression by "no injuries" statements
//! 4. certainty preference
//! 5. pain-specific constraint
//! 6. one representative per label
//! 7. ordering by note position
//!
//! Identical `(evidence, config)` always yields identical output. The evidence
//! is never modified.

use crate::model::{AllowedInjury, EvaluatorConfig, FinalInjury, InjuryMention, Layer1Evidence};

mod filters;
mod synthesis;
pub mod trace;

use filters::Suppression;
pub use trace::{EvaluationOutcome, ExclusionReason, MentionDecision, Verdict};

/// An admissible mention with its resolved label
struct Candidate<'a> {
    index: usize,
    mention: &'a InjuryMention,
    injury: AllowedInjury,
}

/// Records resolved labels and exclusion reasons by mention index
struct ExclusionLog {
    matched: Vec<Option<AllowedInjury>>,
    exclusions: Vec<Option<ExclusionReason>>,
}

impl ExclusionLog {
    fn new(len: usize) -> Self {
        Self {
            matched: vec![None; len],
            exclusions: vec![None; len],
        }
    }

    fn resolve(&mut self, index: usize, injury: AllowedInjury) {
        self.matched[index] = Some(injury);
    }

    fn exclude(&mut self, candidate: &Candidate<'_>, reason: ExclusionReason) {
        tracing::debug!(
            index = candidate.index,
            injury = %candidate.injury,
            reason = ?reason,
            "Excluding mention"
        );
        self.exclude_index(candidate.index, reason);
    }

    fn exclude_index(&mut self, index: usize, reason: ExclusionReason) {
        self.exclusions[index] = Some(reason);
    }

    fn into_decisions(self, mentions: &[InjuryMention]) -> Vec<MentionDecision> {
        mentions
            .iter()
            .zip(self.matched)
            .zip(self.exclusions)
            .enumerate()
            .map(|(index, ((mention, matched_injury), exclusion))| MentionDecision {
                index,
                text: mention.text.clone(),
                matched_injury,
                verdict: exclusion.map_or(Verdict::Included, Verdict::Excluded),
            })
            .collect()
    }
}

/// Evaluate evidence into the final, ordered, deduplicated injury list
pub fn evaluate(evidence: &Layer1Evidence, config: &EvaluatorConfig) -> Vec<FinalInjury> {
    evaluate_with_trace(evidence, config).injuries
}

/// Evaluate evidence and report the decision taken for every mention
pub fn evaluate_with_trace(
    evidence: &Layer1Evidence,
    config: &EvaluatorConfig,
) -> EvaluationOutcome {
    let mentions = evidence.injury_mentions.as_slice();
    let mut log = ExclusionLog::new(mentions.len());

    let mut candidates = filters::admissible(mentions, config, &mut log);

    if config.exclude_negated {
        candidates = filters::drop_negated(candidates, &mut log);
    }

    if config.respect_no_injury_statements {
        match filters::apply_no_injury_statements(
            candidates,
            &evidence.no_injury_statements,
            &mut log,
        ) {
            Suppression::Kept(kept) => candidates = kept,
            Suppression::Suppressed => {
                tracing::debug!(
                    mentions = mentions.len(),
                    "Evaluation suppressed by no-injury statement"
                );
                return EvaluationOutcome {
                    injuries: Vec::new(),
                    decisions: log.into_decisions(mentions),
                };
            }
        }
    }

    if config.prefer_explicit {
        candidates = filters::prefer_explicit(candidates, &mut log);
    }

    if config.strict_pain_evaluation {
        candidates = filters::strict_pain(candidates, &mut log);
    }

    let representatives = synthesis::deduplicate(candidates, &mut log);
    let injuries = synthesis::into_final_injuries(representatives);

    tracing::debug!(
        mentions = mentions.len(),
        injuries = injuries.len(),
        "Evaluation complete"
    );

    EvaluationOutcome {
        injuries,
        decisions: log.into_decisions(mentions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Certainty, NoInjuryStatement, TemporalRelation};

    fn mention(text: &str, label: &str, start_char: usize) -> InjuryMention {
        InjuryMention {
            text: text.to_string(),
            injury_candidate: Some(label.to_string()),
            body_site: None,
            is_negated: false,
            negation_text: None,
            temporal_relation_to_fall: TemporalRelation::PostFall,
            certainty: Certainty::Explicit,
            start_char,
            end_char: start_char + text.chars().count(),
        }
    }

    fn no_injury(text: &str, start_char: usize, end_char: usize) -> NoInjuryStatement {
        NoInjuryStatement {
            text: text.to_string(),
            start_char,
            end_char,
        }
    }

    fn evidence_with(mentions: Vec<InjuryMention>) -> Layer1Evidence {
        Layer1Evidence {
            injury_mentions: mentions,
            ..Default::default()
        }
    }

    fn injury(phrase: &str, matched_injury: AllowedInjury) -> FinalInjury {
        FinalInjury {
            phrase: phrase.to_string(),
            matched_injury,
        }
    }

    #[test]
    fn test_empty_evidence_yields_empty_list() {
        let result = evaluate(&Layer1Evidence::default(), &EvaluatorConfig::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_negated_pain_dropped_skin_tear_kept() {
        let evidence = evidence_with(vec![
            InjuryMention {
                body_site: Some("right forearm".to_string()),
                ..mention("New 3cm skin tear on right forearm", "skin tear", 0)
            },
            InjuryMention {
                is_negated: true,
                negation_text: Some("denies".to_string()),
                ..mention("denies other pain", "pain", 40)
            },
        ]);

        let result = evaluate(&evidence, &EvaluatorConfig::default());
        assert_eq!(
            result,
            vec![injury(
                "New 3cm skin tear on right forearm",
                AllowedInjury::SkinTear
            )]
        );
    }

    #[test]
    fn test_no_injury_statement_alone_yields_empty() {
        let evidence = Layer1Evidence {
            no_injury_statements: vec![no_injury("no injuries noted", 0, 18)],
            ..Default::default()
        };
        assert!(evaluate(&evidence, &EvaluatorConfig::default()).is_empty());
    }

    #[test]
    fn test_later_explicit_mention_overrides_no_injury_statement() {
        let evidence = Layer1Evidence {
            injury_mentions: vec![mention("skin tear to left hand", "skin tear", 100)],
            no_injury_statements: vec![no_injury("no injuries noted", 0, 18)],
            ..Default::default()
        };

        let result = evaluate(&evidence, &EvaluatorConfig::default());
        assert_eq!(
            result,
            vec![injury("skin tear to left hand", AllowedInjury::SkinTear)]
        );
    }

    #[test]
    fn test_mentions_before_statement_are_suppressed() {
        let evidence = Layer1Evidence {
            injury_mentions: vec![mention("bruise on hip", "bruise", 0)],
            no_injury_statements: vec![no_injury("no injuries noted", 20, 37)],
            ..Default::default()
        };

        let outcome = evaluate_with_trace(&evidence, &EvaluatorConfig::default());
        assert!(outcome.injuries.is_empty());
        assert_eq!(
            outcome.excluded_by(ExclusionReason::SuppressedByNoInjuryStatement),
            vec![0]
        );
    }

    #[test]
    fn test_suppression_uses_latest_statement() {
        // Mention follows the first statement but not the second
        let evidence = Layer1Evidence {
            injury_mentions: vec![mention("bruise on hip", "bruise", 30)],
            no_injury_statements: vec![
                no_injury("no injuries", 0, 11),
                no_injury("no injury found on exam", 60, 83),
            ],
            ..Default::default()
        };
        assert!(evaluate(&evidence, &EvaluatorConfig::default()).is_empty());
    }

    #[test]
    fn test_mention_starting_at_statement_end_is_not_after() {
        let evidence = Layer1Evidence {
            injury_mentions: vec![mention("bruise", "bruise", 18)],
            no_injury_statements: vec![no_injury("no injuries noted", 0, 18)],
            ..Default::default()
        };
        assert!(evaluate(&evidence, &EvaluatorConfig::default()).is_empty());
    }

    #[test]
    fn test_implied_mention_after_statement_does_not_override() {
        let evidence = Layer1Evidence {
            injury_mentions: vec![InjuryMention {
                certainty: Certainty::Implied,
                ..mention("possible bruising", "bruise", 50)
            }],
            no_injury_statements: vec![no_injury("no injuries noted", 0, 18)],
            ..Default::default()
        };
        assert!(evaluate(&evidence, &EvaluatorConfig::default()).is_empty());
    }

    #[test]
    fn test_statement_ignored_when_disabled() {
        let evidence = Layer1Evidence {
            injury_mentions: vec![mention("bruise on hip", "bruise", 0)],
            no_injury_statements: vec![no_injury("no injuries noted", 20, 37)],
            ..Default::default()
        };
        let config = EvaluatorConfig {
            respect_no_injury_statements: false,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&evidence, &config),
            vec![injury("bruise on hip", AllowedInjury::Bruise)]
        );
    }

    #[test]
    fn test_longer_phrase_wins_deduplication() {
        let evidence = evidence_with(vec![
            mention("bruise", "bruise", 0),
            InjuryMention {
                body_site: Some("right knee".to_string()),
                ..mention("large bruise on right knee", "bruise", 20)
            },
        ]);

        let outcome = evaluate_with_trace(&evidence, &EvaluatorConfig::default());
        assert_eq!(
            outcome.injuries,
            vec![injury("large bruise on right knee", AllowedInjury::Bruise)]
        );
        assert_eq!(
            outcome.decision(0).unwrap().verdict,
            Verdict::Excluded(ExclusionReason::Duplicate { kept_index: 1 })
        );
    }

    #[test]
    fn test_equal_length_prefers_phrase_naming_its_site() {
        let evidence = evidence_with(vec![
            InjuryMention {
                body_site: Some("hip".to_string()),
                ..mention("bruise, purple", "bruise", 0)
            },
            InjuryMention {
                body_site: Some("hip".to_string()),
                ..mention("bruise on hip!", "bruise", 30)
            },
        ]);

        let result = evaluate(&evidence, &EvaluatorConfig::default());
        assert_eq!(result, vec![injury("bruise on hip!", AllowedInjury::Bruise)]);
    }

    #[test]
    fn test_site_match_is_case_insensitive() {
        let evidence = evidence_with(vec![
            InjuryMention {
                body_site: Some("Knee".to_string()),
                ..mention("bruise, faint", "bruise", 0)
            },
            InjuryMention {
                body_site: Some("Knee".to_string()),
                ..mention("bruised KNEE.", "bruise", 30)
            },
        ]);

        let result = evaluate(&evidence, &EvaluatorConfig::default());
        assert_eq!(result, vec![injury("bruised KNEE.", AllowedInjury::Bruise)]);
    }

    #[test]
    fn test_full_tie_keeps_earliest_mention() {
        let evidence = evidence_with(vec![
            mention("bruise B", "bruise", 40),
            mention("bruise A", "bruise", 10),
        ]);

        let result = evaluate(&evidence, &EvaluatorConfig::default());
        assert_eq!(result, vec![injury("bruise A", AllowedInjury::Bruise)]);
    }

    #[test]
    fn test_pain_without_site_or_timing_dropped() {
        let evidence = evidence_with(vec![InjuryMention {
            temporal_relation_to_fall: TemporalRelation::Unknown,
            ..mention("complains of pain", "pain", 0)
        }]);

        let outcome = evaluate_with_trace(&evidence, &EvaluatorConfig::default());
        assert!(outcome.injuries.is_empty());
        assert_eq!(
            outcome.excluded_by(ExclusionReason::PainWithoutContext),
            vec![0]
        );
    }

    #[test]
    fn test_pain_with_site_kept() {
        let evidence = evidence_with(vec![InjuryMention {
            body_site: Some("right shoulder".to_string()),
            temporal_relation_to_fall: TemporalRelation::Unknown,
            ..mention("pain in right shoulder", "pain", 5)
        }]);

        let result = evaluate(&evidence, &EvaluatorConfig::default());
        assert_eq!(
            result,
            vec![injury("pain in right shoulder", AllowedInjury::Pain)]
        );
    }

    #[test]
    fn test_pain_explicit_post_fall_kept_without_site() {
        let evidence = evidence_with(vec![mention("reports pain after fall", "pain", 0)]);
        assert_eq!(evaluate(&evidence, &EvaluatorConfig::default()).len(), 1);
    }

    #[test]
    fn test_pain_blank_site_counts_as_missing() {
        let evidence = evidence_with(vec![InjuryMention {
            body_site: Some("  ".to_string()),
            temporal_relation_to_fall: TemporalRelation::PreFall,
            ..mention("chronic pain", "pain", 0)
        }]);
        assert!(evaluate(&evidence, &EvaluatorConfig::default()).is_empty());
    }

    #[test]
    fn test_pain_rule_disabled_keeps_pain() {
        let evidence = evidence_with(vec![InjuryMention {
            temporal_relation_to_fall: TemporalRelation::Unknown,
            ..mention("complains of pain", "pain", 0)
        }]);
        let config = EvaluatorConfig {
            strict_pain_evaluation: false,
            ..Default::default()
        };
        assert_eq!(evaluate(&evidence, &config).len(), 1);
    }

    #[test]
    fn test_explicit_replaces_weaker_evidence() {
        let evidence = evidence_with(vec![
            InjuryMention {
                certainty: Certainty::Implied,
                ..mention("may have hit head", "head injury", 0)
            },
            mention("abrasion to elbow", "abrasion", 30),
            InjuryMention {
                certainty: Certainty::Unclear,
                ..mention("swelling?", "swelling", 60)
            },
        ]);

        let outcome = evaluate_with_trace(&evidence, &EvaluatorConfig::default());
        assert_eq!(
            outcome.injuries,
            vec![injury("abrasion to elbow", AllowedInjury::Abrasion)]
        );
        assert_eq!(
            outcome.excluded_by(ExclusionReason::WeakerCertainty),
            vec![0, 2]
        );
    }

    #[test]
    fn test_weaker_evidence_kept_when_nothing_explicit() {
        let evidence = evidence_with(vec![
            InjuryMention {
                certainty: Certainty::Implied,
                ..mention("may have hit head", "head injury", 0)
            },
            InjuryMention {
                certainty: Certainty::Unclear,
                ..mention("swelling?", "swelling", 60)
            },
        ]);
        assert_eq!(evaluate(&evidence, &EvaluatorConfig::default()).len(), 2);
    }

    #[test]
    fn test_prefer_explicit_disabled_keeps_all_certainties() {
        let evidence = evidence_with(vec![
            InjuryMention {
                certainty: Certainty::Implied,
                ..mention("may have hit head", "head injury", 0)
            },
            mention("abrasion to elbow", "abrasion", 30),
        ]);
        let config = EvaluatorConfig {
            prefer_explicit: false,
            ..Default::default()
        };
        assert_eq!(evaluate(&evidence, &config).len(), 2);
    }

    #[test]
    fn test_inadmissible_labels_excluded() {
        let evidence = evidence_with(vec![
            mention("felt dizzy", "dizziness", 0),
            InjuryMention {
                injury_candidate: None,
                ..mention("unsteady gait", "", 15)
            },
            mention("Skin Tear on shin", "Skin Tear", 30),
            mention("cut on chin", "cut", 50),
        ]);

        let outcome = evaluate_with_trace(&evidence, &EvaluatorConfig::default());
        assert_eq!(outcome.injuries, vec![injury("cut on chin", AllowedInjury::Cut)]);
        assert_eq!(
            outcome.excluded_by(ExclusionReason::Inadmissible),
            vec![0, 1, 2]
        );
        assert_eq!(outcome.decision(3).unwrap().matched_injury, Some(AllowedInjury::Cut));
    }

    #[test]
    fn test_lenient_matching_normalizes_labels() {
        let evidence = evidence_with(vec![
            mention("Skin Tear on shin", "Skin_Tear", 30),
            mention("felt dizzy", "dizziness", 0),
        ]);
        let config = EvaluatorConfig {
            require_exact_match: false,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&evidence, &config),
            vec![injury("Skin Tear on shin", AllowedInjury::SkinTear)]
        );
    }

    #[test]
    fn test_negated_kept_when_exclusion_disabled() {
        let evidence = evidence_with(vec![InjuryMention {
            is_negated: true,
            body_site: Some("back".to_string()),
            ..mention("denies back pain", "pain", 0)
        }]);
        let config = EvaluatorConfig {
            exclude_negated: false,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&evidence, &config),
            vec![injury("denies back pain", AllowedInjury::Pain)]
        );
    }

    #[test]
    fn test_output_sorted_by_position_then_label() {
        let evidence = evidence_with(vec![
            mention("swelling", "swelling", 50),
            mention("abrasion", "abrasion", 10),
            mention("redness and bruise", "redness", 30),
            mention("redness and bruise", "bruise", 30),
        ]);

        let labels: Vec<AllowedInjury> = evaluate(&evidence, &EvaluatorConfig::default())
            .into_iter()
            .map(|i| i.matched_injury)
            .collect();
        assert_eq!(
            labels,
            vec![
                AllowedInjury::Abrasion,
                AllowedInjury::Bruise,
                AllowedInjury::Redness,
                AllowedInjury::Swelling,
            ]
        );
    }

    #[test]
    fn test_order_uses_representative_position() {
        // The kept bruise is the later, longer mention
        let evidence = evidence_with(vec![
            mention("bruise", "bruise", 0),
            mention("laceration", "laceration", 20),
            mention("dark bruise over left hip", "bruise", 40),
        ]);

        let phrases: Vec<String> = evaluate(&evidence, &EvaluatorConfig::default())
            .into_iter()
            .map(|i| i.phrase)
            .collect();
        assert_eq!(phrases, vec!["laceration", "dark bruise over left hip"]);
    }

    #[test]
    fn test_properties_hold_on_mixed_evidence() {
        let mentions = vec![
            mention("bruise", "bruise", 80),
            InjuryMention {
                is_negated: true,
                ..mention("no fracture", "fracture", 10)
            },
            InjuryMention {
                body_site: Some("left wrist".to_string()),
                ..mention("pain to left wrist", "pain", 40)
            },
            mention("large bruise on right knee", "bruise", 100),
            InjuryMention {
                certainty: Certainty::Unclear,
                ..mention("maybe swollen", "swelling", 5)
            },
            mention("tiny cut", "cut", 40),
        ];
        let evidence = evidence_with(mentions.clone());
        let config = EvaluatorConfig::default();

        let first = evaluate(&evidence, &config);
        let second = evaluate(&evidence, &config);
        assert_eq!(first, second);

        // Unique labels
        let mut labels: Vec<AllowedInjury> = first.iter().map(|i| i.matched_injury).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), first.len());

        // Phrases are verbatim and never come from negated mentions
        for entry in &first {
            assert!(mentions.iter().any(|m| m.text == entry.phrase));
            assert!(
                !mentions
                    .iter()
                    .any(|m| m.is_negated && m.text == entry.phrase)
            );
        }

        assert_eq!(
            first,
            vec![
                injury("tiny cut", AllowedInjury::Cut),
                injury("pain to left wrist", AllowedInjury::Pain),
                injury("large bruise on right knee", AllowedInjury::Bruise),
            ]
        );

        // Input untouched
        assert_eq!(evidence.injury_mentions, mentions);
    }

    #[test]
    fn test_trace_covers_every_mention() {
        let evidence = evidence_with(vec![
            mention("abrasion", "abrasion", 0),
            mention("felt dizzy", "dizziness", 10),
        ]);
        let outcome = evaluate_with_trace(&evidence, &EvaluatorConfig::default());

        assert_eq!(outcome.decisions.len(), 2);
        assert_eq!(outcome.decisions[0].verdict, Verdict::Included);
        assert_eq!(outcome.decisions[1].matched_injury, None);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["decisions"][0]["verdict"], "included");
        assert_eq!(
            json["decisions"][1]["verdict"],
            serde_json::json!({"excluded": "inadmissible"})
        );
    }
}
