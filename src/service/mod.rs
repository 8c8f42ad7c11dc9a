pub mod evaluator;
pub mod validation;

pub use evaluator::{evaluate, evaluate_with_trace};
pub use validation::validate_evidence;
