//! Credential resolution against a store

use super::request::{ResolveMode, ResolveRequest, KEY_PASSWORD};
use crate::entry::CredentialEntry;
use crate::matching::{MatchEngine, MatchObserver, MatchResult, NoopObserver, TracingObserver};
use crate::profile::AttributeProfile;
use crate::store::CredentialStore;
use crate::Secret;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Outcome of a resolution
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A server matched; its password is returned
    Found {
        id: String,
        secret: Secret,
        score: usize,
    },
    /// No server matched, or matching servers had no password
    NotFound,
    /// The query carried no attributes, so nothing was searched
    NothingToMatch,
}

impl Resolution {
    pub fn secret(&self) -> Option<&Secret> {
        match self {
            Resolution::Found { secret, .. } => Some(secret),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }
}

impl From<MatchResult> for Resolution {
    fn from(result: MatchResult) -> Self {
        match result {
            MatchResult::Found { id, secret, score } => Resolution::Found { id, secret, score },
            MatchResult::NotFound => Resolution::NotFound,
        }
    }
}

/// Resolves passwords by matching requests against a credential store
pub struct CredentialResolver {
    /// Store providing decrypted candidates
    store: Arc<dyn CredentialStore>,
    /// Observer used for standalone requests
    observer: Arc<dyn MatchObserver>,
}

impl CredentialResolver {
    /// Create a resolver that traces standalone requests through `tracing`
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Create a resolver with a custom observer for standalone requests
    pub fn with_observer(
        store: Arc<dyn CredentialStore>,
        observer: Arc<dyn MatchObserver>,
    ) -> Self {
        Self { store, observer }
    }

    /// Resolve the password for a request.
    ///
    /// Never fails: an unavailable store counts as an empty one.
    pub async fn resolve(&self, request: &ResolveRequest) -> Resolution {
        let span = info_span!("resolve", request_id = %request.request_id, mode = ?request.mode);
        self.resolve_inner(request).instrument(span).await
    }

    async fn resolve_inner(&self, request: &ResolveRequest) -> Resolution {
        let standalone = request.mode == ResolveMode::Standalone;

        if standalone {
            info!(
                query = %request.query,
                "Server configuration should match as many attributes as possible"
            );
        }

        if !request.query.has_any_value() {
            info!("No attributes to match specified, not searching for a matching server");
            return Resolution::NothingToMatch;
        }

        let candidates = self.candidates().await;
        if candidates.is_empty() {
            info!("No servers defined in the credential store");
        }

        let engine = if standalone {
            MatchEngine::with_observer(self.observer.clone())
        } else {
            MatchEngine::with_observer(Arc::new(NoopObserver))
        };

        let resolution = Resolution::from(engine.select_best_match(&request.query, &candidates));
        match &resolution {
            Resolution::Found { id, score, .. } => {
                info!(id = %id, score, "Matching server found, password extracted");
            }
            _ => {
                info!("No matching server found, or matching server(s) had no password specified");
            }
        }

        resolution
    }

    /// Resolve using a caller context.
    ///
    /// In embedded mode a found password is written to the context under
    /// `password`. Nothing is written otherwise.
    pub async fn resolve_context(
        &self,
        context: &mut HashMap<String, String>,
        params: AttributeProfile,
    ) -> Resolution {
        let request = ResolveRequest::from_context(context, params);
        let resolution = self.resolve(&request).await;

        if request.mode == ResolveMode::Embedded {
            if let Some(secret) = resolution.secret() {
                context.insert(KEY_PASSWORD.to_string(), secret.expose().to_string());
            }
        }

        resolution
    }

    /// Fetch candidates, treating any store failure as an empty list
    async fn candidates(&self) -> Vec<CredentialEntry> {
        match self.store.list_decrypted_candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "Credential store unavailable, continuing without servers");
                Vec::new()
            }
        }
    }
}
