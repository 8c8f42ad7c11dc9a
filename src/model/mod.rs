pub mod config;
pub mod evidence;
pub mod injury;

pub use config::{Config, EvaluatorConfig};
pub use evidence::{
    BodySite, Certainty, EvidenceMetadata, InjuryMention, Layer1Evidence, Negation,
    NoInjuryStatement, TemporalRelation, TimingMarker,
};
pub use injury::{AllowedInjury, FinalInjury, UnknownInjuryLabel};
