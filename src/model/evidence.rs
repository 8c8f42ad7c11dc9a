//! Layer 1 evidence bundle
//!
//! The shape an upstream extractor is prompted to emit for one note. Field names
//! are part of the wire contract and must not change.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::EvidenceError;

/// Relation of an observation to the fall event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemporalRelation {
    PostFall,
    DuringFall,
    PreFall,
    Unknown,
}

impl TemporalRelation {
    /// True for observations made at or after the fall
    pub fn is_fall_related(&self) -> bool {
        matches!(self, TemporalRelation::PostFall | TemporalRelation::DuringFall)
    }
}

/// How directly the note states the observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Certainty {
    Explicit,
    Implied,
    Unclear,
}

/// One candidate injury observation extracted from note text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InjuryMention {
    /// Exact substring of the note
    pub text: String,
    /// Raw label proposed by the extractor; resolved against the allowed
    /// vocabulary by the evaluator
    pub injury_candidate: Option<String>,
    pub body_site: Option<String>,
    pub is_negated: bool,
    #[serde(default)]
    pub negation_text: Option<String>,
    pub temporal_relation_to_fall: TemporalRelation,
    pub certainty: Certainty,
    pub start_char: usize,
    pub end_char: usize,
}

/// Denial phrase not tied to a specific mention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Negation {
    pub text: String,
    pub start_char: usize,
    pub end_char: usize,
}

/// Global denial such as "no injuries noted"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NoInjuryStatement {
    pub text: String,
    pub start_char: usize,
    pub end_char: usize,
}

/// Phrase placing something relative to the fall ("after the fall", "prior to")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimingMarker {
    pub text: String,
    pub relation: TemporalRelation,
    pub start_char: usize,
    pub end_char: usize,
}

/// Anatomical location mentioned in the note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BodySite {
    pub text: String,
    pub start_char: usize,
    pub end_char: usize,
}

/// Extraction metadata. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceMetadata {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Any further keys the extractor emitted, kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Full evidence bundle for one note
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Layer1Evidence {
    #[serde(default)]
    pub injury_mentions: Vec<InjuryMention>,
    #[serde(default)]
    pub negations: Vec<Negation>,
    #[serde(default)]
    pub no_injury_statements: Vec<NoInjuryStatement>,
    #[serde(default)]
    pub timing_markers: Vec<TimingMarker>,
    #[serde(default)]
    pub body_sites: Vec<BodySite>,
    #[serde(default)]
    pub metadata: EvidenceMetadata,
}

impl Layer1Evidence {
    /// Parse an evidence bundle from JSON
    pub fn from_json(json: &str) -> Result<Self, EvidenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// JSON Schema of the bundle, as handed to extractors
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Layer1Evidence)
    }
}
