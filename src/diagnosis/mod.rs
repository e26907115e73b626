//! Condition scoring over a completed intake.

pub mod reference;
pub mod scoring;
pub mod summary;
pub mod vitals;

pub use scoring::{score_conditions, Confidence, ConditionMatch};
pub use summary::{build_summary, SessionSummary};
