//! Offline validation: extraction, syntax classification and merging.
//!
//! Everything here is synchronous and free of I/O.

pub mod extract;
pub mod merge;
mod model;
pub mod syntax;

pub use extract::{ExtractMode, count, extract, extract_tokens, extract_with, normalize, unique};
pub use merge::merge;
pub use model::{Outcome, OutcomeStatus, RiskLevel, SyntaxVerdict, VerifierVerdict};
pub use syntax::{SyntaxError, classify, suggest_domain};
