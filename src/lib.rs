//! Deterministic evaluation of extracted fall-incident injury evidence
//!
//! An upstream extractor turns a clinical note into a [`Layer1Evidence`]
//! bundle. [`evaluate`] applies a fixed set of rules to that bundle and returns
//! the final, reproducible list of reportable injuries.

pub mod error;
pub mod model;
pub mod service;

pub use error::EvidenceError;
pub use model::{AllowedInjury, EvaluatorConfig, FinalInjury, Layer1Evidence};
pub use service::evaluator::{EvaluationOutcome, evaluate, evaluate_with_trace};
pub use service::validation::{EvidenceValidationResult, validate_evidence};
