//! Closed injury vocabulary and the final output record

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Injury labels the evaluator is allowed to emit
///
/// This is the only vocabulary that can appear in `FinalInjury::matched_injury`.
/// Candidates outside it are inadmissible.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum AllowedInjury {
    #[serde(rename = "abrasion")]
    Abrasion,
    #[serde(rename = "bleeding")]
    Bleeding,
    #[serde(rename = "bruise")]
    Bruise,
    #[serde(rename = "bump")]
    Bump,
    #[serde(rename = "burn")]
    Burn,
    #[serde(rename = "concussion")]
    Concussion,
    #[serde(rename = "cut")]
    Cut,
    #[serde(rename = "dislocation")]
    Dislocation,
    #[serde(rename = "fracture")]
    Fracture,
    #[serde(rename = "head injury")]
    HeadInjury,
    #[serde(rename = "hematoma")]
    Hematoma,
    #[serde(rename = "laceration")]
    Laceration,
    #[serde(rename = "pain")]
    Pain,
    #[serde(rename = "redness")]
    Redness,
    #[serde(rename = "scratch")]
    Scratch,
    #[serde(rename = "skin tear")]
    SkinTear,
    #[serde(rename = "sprain")]
    Sprain,
    #[serde(rename = "strain")]
    Strain,
    #[serde(rename = "swelling")]
    Swelling,
}

impl AllowedInjury {
    /// Every allowed label, in alphabetical order
    pub const ALL: [AllowedInjury; 19] = [
        AllowedInjury::Abrasion,
        AllowedInjury::Bleeding,
        AllowedInjury::Bruise,
        AllowedInjury::Bump,
        AllowedInjury::Burn,
        AllowedInjury::Concussion,
        AllowedInjury::Cut,
        AllowedInjury::Dislocation,
        AllowedInjury::Fracture,
        AllowedInjury::HeadInjury,
        AllowedInjury::Hematoma,
        AllowedInjury::Laceration,
        AllowedInjury::Pain,
        AllowedInjury::Redness,
        AllowedInjury::Scratch,
        AllowedInjury::SkinTear,
        AllowedInjury::Sprain,
        AllowedInjury::Strain,
        AllowedInjury::Swelling,
    ];

    /// Wire label, e.g. `"skin tear"`
    pub fn label(&self) -> &'static str {
        match self {
            AllowedInjury::Abrasion => "abrasion",
            AllowedInjury::Bleeding => "bleeding",
            AllowedInjury::Bruise => "bruise",
            AllowedInjury::Bump => "bump",
            AllowedInjury::Burn => "burn",
            AllowedInjury::Concussion => "concussion",
            AllowedInjury::Cut => "cut",
            AllowedInjury::Dislocation => "dislocation",
            AllowedInjury::Fracture => "fracture",
            AllowedInjury::HeadInjury => "head injury",
            AllowedInjury::Hematoma => "hematoma",
            AllowedInjury::Laceration => "laceration",
            AllowedInjury::Pain => "pain",
            AllowedInjury::Redness => "redness",
            AllowedInjury::Scratch => "scratch",
            AllowedInjury::SkinTear => "skin tear",
            AllowedInjury::Sprain => "sprain",
            AllowedInjury::Strain => "strain",
            AllowedInjury::Swelling => "swelling",
        }
    }

    /// Exact lookup: the candidate must equal a label byte for byte
    pub fn from_label(candidate: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|injury| injury.label() == candidate)
    }

    /// Lenient lookup used when exact matching is disabled
    ///
    /// Trims, lowercases, treats `_` and `-` as spaces and collapses whitespace
    /// before comparing, so `"Skin_Tear"` resolves to `SkinTear`.
    pub fn from_label_normalized(candidate: &str) -> Option<Self> {
        let normalized = candidate
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        Self::from_label(&normalized)
    }
}

impl fmt::Display for AllowedInjury {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing a label outside the allowed vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an allowed injury label: '{0}'")]
pub struct UnknownInjuryLabel(pub String);

impl FromStr for AllowedInjury {
    type Err = UnknownInjuryLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownInjuryLabel(s.to_string()))
    }
}

/// One reportable injury: the verbatim note phrase and the label it matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FinalInjury {
    pub phrase: String,
    pub matched_injury: AllowedInjury,
}
