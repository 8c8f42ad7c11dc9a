//! Grounding checks for Layer 1 evidence
//!
//! Confirms that extracted evidence actually comes from the note it claims to
//! describe. Evaluation never depends on these checks; they let callers reject
//! or flag a bad extraction before trusting its result.

use crate::model::{AllowedInjury, Layer1Evidence};

/// Result of evidence validation
#[derive(Debug)]
pub struct EvidenceValidationResult {
    /// Whether the evidence passed validation
    pub is_valid: bool,
    /// Critical errors that indicate ungrounded or malformed evidence
    pub errors: Vec<String>,
    /// Warnings that indicate potential quality issues
    pub warnings: Vec<String>,
}

impl EvidenceValidationResult {
    /// Create a new validation result with no issues
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the validation result
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the validation result
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Validate an evidence bundle against the note text it was extracted from
///
/// Checks:
/// 1. Every span has `start_char <= end_char`
/// 2. Every span ends within the note
/// 3. Mention text occurs in the note (grounding)
/// 4. Mention text matches the note at its offsets
/// 5. Candidate labels belong to the allowed vocabulary
/// 6. Negated mentions carry their negation phrase
/// 7. Body sites occur in the note
pub fn validate_evidence(evidence: &Layer1Evidence, note_text: &str) -> EvidenceValidationResult {
    let mut result = EvidenceValidationResult::valid();
    let note_len = note_text.chars().count();
    let normalized_note = normalize_whitespace(note_text);
    let note_lower = note_text.to_lowercase();

    let spans = evidence
        .injury_mentions
        .iter()
        .map(|m| ("Mention", m.start_char, m.end_char))
        .enumerate()
        .chain(
            evidence
                .negations
                .iter()
                .map(|n| ("Negation", n.start_char, n.end_char))
                .enumerate(),
        )
        .chain(
            evidence
                .no_injury_statements
                .iter()
                .map(|s| ("No-injury statement", s.start_char, s.end_char))
                .enumerate(),
        )
        .chain(
            evidence
                .timing_markers
                .iter()
                .map(|t| ("Timing marker", t.start_char, t.end_char))
                .enumerate(),
        )
        .chain(
            evidence
                .body_sites
                .iter()
                .map(|b| ("Body site", b.start_char, b.end_char))
                .enumerate(),
        );

    // Checks 1 and 2
    for (i, (kind, start, end)) in spans {
        if start > end {
            result.add_error(format!(
                "{} {} has start_char {} after end_char {}",
                kind,
                i + 1,
                start,
                end
            ));
        } else if end > note_len {
            result.add_error(format!(
                "{} {} ends at {} beyond note length {}",
                kind,
                i + 1,
                end,
                note_len
            ));
        }
    }

    for (i, mention) in evidence.injury_mentions.iter().enumerate() {
        // Check 3
        let normalized_text = normalize_whitespace(&mention.text);
        if normalized_text.is_empty() {
            result.add_error(format!("Mention {} has empty text", i + 1));
        } else if !normalized_note.contains(&normalized_text) {
            result.add_error(format!(
                "Mention {} text not found in note: '{}'",
                i + 1,
                mention.text.chars().take(100).collect::<String>()
            ));
        }

        // Check 4
        if mention.start_char <= mention.end_char && mention.end_char <= note_len {
            let at_offsets = char_slice(note_text, mention.start_char, mention.end_char);
            if at_offsets != mention.text {
                result.add_warning(format!(
                    "Mention {} offsets {}..{} point at '{}', not its text",
                    i + 1,
                    mention.start_char,
                    mention.end_char,
                    at_offsets.chars().take(100).collect::<String>()
                ));
            }
        }

        // Check 5
        match mention.injury_candidate.as_deref() {
            Some(label) if AllowedInjury::from_label(label).is_none() => {
                result.add_warning(format!(
                    "Mention {} has label '{}' outside the allowed vocabulary",
                    i + 1,
                    label
                ));
            }
            None => {
                result.add_warning(format!("Mention {} has no injury candidate", i + 1));
            }
            Some(_) => {}
        }

        // Check 6
        let has_negation_text = mention
            .negation_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if mention.is_negated && !has_negation_text {
            result.add_warning(format!(
                "Mention {} is negated but has no negation text",
                i + 1
            ));
        }

        // Check 7
        if let Some(site) = mention.body_site.as_deref()
            && !site.trim().is_empty()
            && !note_lower.contains(&site.trim().to_lowercase())
        {
            result.add_warning(format!(
                "Mention {} body site '{}' not found in note",
                i + 1,
                site
            ));
        }
    }

    result
}

/// Normalize whitespace for comparison (collapse multiple spaces, trim)
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Substring by character offsets
fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}
