//! Scoring and selection

use super::observer::{MatchObserver, NoopObserver, SkipReason};
use crate::entry::CredentialEntry;
use crate::profile::AttributeProfile;
use crate::Secret;
use std::sync::Arc;

/// Outcome of a best-match search
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// A candidate matched at least one attribute
    Found {
        /// Id of the winning entry
        id: String,
        /// The winning entry's secret
        secret: Secret,
        /// Number of matching attributes
        score: usize,
    },
    /// No candidate matched
    NotFound,
}

impl MatchResult {
    /// The secret of the winning entry, if any
    pub fn secret(&self) -> Option<&Secret> {
        match self {
            MatchResult::Found { secret, .. } => Some(secret),
            MatchResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found { .. })
    }
}

/// Selects the candidate whose profile overlaps the query the most
pub struct MatchEngine {
    observer: Arc<dyn MatchObserver>,
}

impl MatchEngine {
    /// Create an engine without any observer
    pub fn new() -> Self {
        Self {
            observer: Arc::new(NoopObserver),
        }
    }

    /// Create an engine reporting its decisions to `observer`
    pub fn with_observer(observer: Arc<dyn MatchObserver>) -> Self {
        Self { observer }
    }

    /// Pick the best matching candidate for `query`.
    ///
    /// Candidates are visited in the given order. A candidate replaces the
    /// current best only with a strictly higher score, so on a tie the
    /// earliest candidate wins. A score of zero never wins. Candidates
    /// without a secret or without a configuration block are skipped.
    pub fn select_best_match(
        &self,
        query: &AttributeProfile,
        candidates: &[CredentialEntry],
    ) -> MatchResult {
        if !query.has_any_value() {
            return MatchResult::NotFound;
        }

        self.observer.on_search(query, candidates.len());

        let mut best_score = 0;
        let mut best: Option<(&CredentialEntry, &Secret)> = None;

        for candidate in candidates {
            let (profile, secret) = match (&candidate.profile, &candidate.secret) {
                (_, None) => {
                    self.observer.on_skipped(candidate, SkipReason::NoSecret);
                    continue;
                }
                (None, Some(_)) => {
                    self.observer.on_skipped(candidate, SkipReason::NoConfiguration);
                    continue;
                }
                (Some(profile), Some(secret)) => (profile, secret),
            };

            let score = query.compare(profile);
            self.observer.on_scored(candidate, profile, score);

            if score > best_score {
                best_score = score;
                best = Some((candidate, secret));
                self.observer.on_new_best(candidate, score);
            }
        }

        match best {
            Some((entry, secret)) => MatchResult::Found {
                id: entry.id.clone(),
                secret: secret.clone(),
                score: best_score,
            },
            None => MatchResult::NotFound,
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn entry(
        id: &str,
        host: Option<&str>,
        account: Option<&str>,
        user: Option<&str>,
        secret: &str,
    ) -> CredentialEntry {
        CredentialEntry::new(
            id,
            AttributeProfile::new(
                host.map(String::from),
                account.map(String::from),
                user.map(String::from),
            ),
            secret,
        )
    }

    fn winner(result: &MatchResult) -> Option<&str> {
        result.secret().map(|s| s.expose())
    }

    /// Records every observer callback for assertions
    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl MatchObserver for RecordingObserver {
        fn on_search(&self, _query: &AttributeProfile, candidates: usize) {
            self.events.lock().push(format!("search:{}", candidates));
        }

        fn on_skipped(&self, entry: &CredentialEntry, reason: SkipReason) {
            self.events.lock().push(format!("skip:{}:{:?}", entry.id, reason));
        }

        fn on_scored(&self, entry: &CredentialEntry, _profile: &AttributeProfile, score: usize) {
            self.events.lock().push(format!("score:{}:{}", entry.id, score));
        }

        fn on_new_best(&self, entry: &CredentialEntry, score: usize) {
            self.events.lock().push(format!("best:{}:{}", entry.id, score));
        }
    }

    #[test]
    fn test_more_matching_attributes_wins() {
        let query = AttributeProfile::empty().with_host("h1").with_account("a1");
        let candidates = vec![
            entry("s1", Some("h1"), None, None, "p1"),
            entry("s2", Some("h1"), Some("a1"), Some("u1"), "p2"),
        ];

        let result = MatchEngine::new().select_best_match(&query, &candidates);
        assert_eq!(winner(&result), Some("p2"));
        assert!(matches!(result, MatchResult::Found { ref id, score: 2, .. } if id == "s2"));
    }

    #[test]
    fn test_first_candidate_wins_ties() {
        let query = AttributeProfile::empty().with_host("h1");
        let candidates = vec![
            entry("s1", Some("h1"), None, None, "p1"),
            entry("s2", Some("h1"), None, None, "p2"),
        ];

        let result = MatchEngine::new().select_best_match(&query, &candidates);
        assert_eq!(winner(&result), Some("p1"));

        let reversed: Vec<_> = candidates.into_iter().rev().collect();
        let result = MatchEngine::new().select_best_match(&query, &reversed);
        assert_eq!(winner(&result), Some("p2"));
    }

    #[test]
    fn test_equal_later_score_does_not_replace_best() {
        let query = AttributeProfile::empty().with_host("h1").with_user("u1");
        let candidates = vec![
            entry("s1", Some("h1"), None, None, "p1"),
            entry("s2", Some("h1"), None, Some("u1"), "p2"),
            entry("s3", Some("H1"), None, Some("U1"), "p3"),
        ];

        let result = MatchEngine::new().select_best_match(&query, &candidates);
        assert_eq!(winner(&result), Some("p2"));
    }

    #[test]
    fn test_zero_score_never_wins() {
        let query = AttributeProfile::empty().with_host("h1");
        let candidates = vec![entry("s1", Some("h2"), None, None, "p1")];

        let result = MatchEngine::new().select_best_match(&query, &candidates);
        assert!(!result.is_found());
    }

    #[test]
    fn test_empty_query_finds_nothing() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = MatchEngine::with_observer(observer.clone());
        let candidates = vec![entry("s1", Some("h1"), Some("a1"), Some("u1"), "p1")];

        let result = engine.select_best_match(&AttributeProfile::empty(), &candidates);
        assert!(!result.is_found());
        // No scoring happens at all
        assert!(observer.events.lock().is_empty());
    }

    #[test]
    fn test_entry_without_secret_is_filtered() {
        let query = AttributeProfile::empty().with_user("U1");
        let candidates = vec![entry("s1", None, None, Some("u1"), "p1").without_secret()];

        let result = MatchEngine::new().select_best_match(&query, &candidates);
        assert!(!result.is_found());
    }

    #[test]
    fn test_entry_without_configuration_is_filtered() {
        let query = AttributeProfile::empty().with_host("h1");
        let candidates = vec![
            entry("s1", Some("h1"), Some("a1"), None, "p1").without_configuration(),
            entry("s2", Some("h1"), None, None, "p2"),
        ];

        let result = MatchEngine::new().select_best_match(&query, &candidates);
        assert_eq!(winner(&result), Some("p2"));
    }

    #[test]
    fn test_no_candidates() {
        let query = AttributeProfile::empty().with_host("h1");
        let result = MatchEngine::new().select_best_match(&query, &[]);
        assert!(!result.is_found());
    }

    #[test]
    fn test_observer_sees_scoring_decisions() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = MatchEngine::with_observer(observer.clone());
        let query = AttributeProfile::empty().with_host("h1").with_account("a1");
        let candidates = vec![
            entry("s1", Some("h1"), None, None, "p1"),
            entry("s2", Some("h1"), None, None, "p2").without_secret(),
            entry("s3", Some("h1"), Some("a1"), None, "p3"),
            entry("s4", None, None, None, "p4").without_configuration(),
        ];

        let result = engine.select_best_match(&query, &candidates);
        assert_eq!(winner(&result), Some("p3"));

        let events = observer.events.lock();
        assert_eq!(
            *events,
            vec![
                "search:4",
                "score:s1:1",
                "best:s1:1",
                "skip:s2:NoSecret",
                "score:s3:2",
                "best:s3:2",
                "skip:s4:NoConfiguration",
            ]
        );
    }
}
