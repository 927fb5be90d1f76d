//! Observers for the scoring loop

use crate::entry::CredentialEntry;
use crate::profile::AttributeProfile;
use tracing::info;

/// Why a candidate was excluded before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No secret is defined for the entry
    NoSecret,
    /// The entry has no configuration block
    NoConfiguration,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoSecret => write!(f, "no password defined"),
            SkipReason::NoConfiguration => write!(f, "no configuration"),
        }
    }
}

/// Receives the decisions made while scoring candidates.
///
/// All methods default to doing nothing.
pub trait MatchObserver: Send + Sync {
    /// The engine is about to search the given number of candidates
    fn on_search(&self, _query: &AttributeProfile, _candidates: usize) {}

    /// A candidate was excluded before scoring
    fn on_skipped(&self, _entry: &CredentialEntry, _reason: SkipReason) {}

    /// A candidate was scored
    fn on_scored(&self, _entry: &CredentialEntry, _profile: &AttributeProfile, _score: usize) {}

    /// A candidate became the current best
    fn on_new_best(&self, _entry: &CredentialEntry, _score: usize) {}
}

/// Observer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MatchObserver for NoopObserver {}

/// Observer that writes a human-readable trace through `tracing`.
///
/// Secrets are never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MatchObserver for TracingObserver {
    fn on_search(&self, query: &AttributeProfile, candidates: usize) {
        info!(query = %query, candidates, "Searching for best matching server");
    }

    fn on_skipped(&self, entry: &CredentialEntry, reason: SkipReason) {
        info!(id = %entry.id, reason = %reason, "Skipping server");
    }

    fn on_scored(&self, entry: &CredentialEntry, profile: &AttributeProfile, score: usize) {
        info!(
            id = %entry.id,
            host = profile.host().unwrap_or("-"),
            account = profile.account().unwrap_or("-"),
            user = profile.user().unwrap_or("-"),
            score,
            "Server scored (password defined, not shown)"
        );
    }

    fn on_new_best(&self, entry: &CredentialEntry, score: usize) {
        info!(id = %entry.id, score, "New best match");
    }
}
