//! Deduplication and ordering (rules 6 and 7)

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{AllowedInjury, FinalInjury};

use super::trace::ExclusionReason;
use super::{Candidate, ExclusionLog};

/// Keep one representative mention per label
pub(super) fn deduplicate<'a>(
    candidates: Vec<Candidate<'a>>,
    log: &mut ExclusionLog,
) -> Vec<Candidate<'a>> {
    let mut by_injury: BTreeMap<AllowedInjury, Vec<Candidate<'a>>> = BTreeMap::new();

    for candidate in candidates {
        by_injury.entry(candidate.injury).or_default().push(candidate);
    }

    let mut representatives = Vec::with_capacity(by_injury.len());

    for mut group in by_injury.into_values() {
        group.sort_by(compare_representatives);

        let mut group = group.into_iter();
        let Some(kept) = group.next() else {
            continue;
        };

        for duplicate in group {
            log.exclude(
                &duplicate,
                ExclusionReason::Duplicate {
                    kept_index: kept.index,
                },
            );
        }

        representatives.push(kept);
    }

    representatives
}

/// Order representatives by note position, then label
pub(super) fn into_final_injuries(mut representatives: Vec<Candidate<'_>>) -> Vec<FinalInjury> {
    representatives.sort_by(|a, b| {
        a.mention
            .start_char
            .cmp(&b.mention.start_char)
            .then_with(|| a.injury.label().cmp(b.injury.label()))
    });

    representatives
        .into_iter()
        .map(|candidate| FinalInjury {
            phrase: candidate.mention.text.clone(),
            matched_injury: candidate.injury,
        })
        .collect()
}

/// `Less` means `a` is the better representative.
///
/// Longer text wins; then text that names its own body site; then the earlier
/// mention in the note; then the earlier mention in the input.
fn compare_representatives(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    let len_a = a.mention.text.chars().count();
    let len_b = b.mention.text.chars().count();

    len_b
        .cmp(&len_a)
        .then_with(|| names_own_site(b).cmp(&names_own_site(a)))
        .then_with(|| a.mention.start_char.cmp(&b.mention.start_char))
        .then_with(|| a.index.cmp(&b.index))
}

fn names_own_site(candidate: &Candidate<'_>) -> bool {
    match candidate.mention.body_site.as_deref().map(str::trim) {
        Some(site) if !site.is_empty() => candidate
            .mention
            .text
            .to_lowercase()
            .contains(&site.to_lowercase()),
        _ => false,
    }
}
