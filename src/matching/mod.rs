//! Best-match selection over credential candidates
//!
//! Handles:
//! - Scoring each candidate against a query profile
//! - Selecting the single best candidate (first max-scorer wins)
//! - Reporting scoring decisions to an optional observer

mod engine;
mod observer;

pub use engine::{MatchEngine, MatchResult};
pub use observer::{MatchObserver, NoopObserver, SkipReason, TracingObserver};
