//! Resolution requests

use crate::profile::AttributeProfile;
use std::collections::HashMap;
use uuid::Uuid;

/// Context key selecting embedded mode (`"true"`, any case)
pub const KEY_INTERNAL: &str = "internal";

/// Context key receiving the resolved password in embedded mode
pub const KEY_PASSWORD: &str = "password";

/// How a resolution was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Invoked by another component through a shared context
    Embedded,
    /// Invoked directly by a user; the result is shown in clear text
    Standalone,
}

/// A single resolution request
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Unique request identifier
    pub request_id: String,
    pub mode: ResolveMode,
    /// Attributes to match servers against
    pub query: AttributeProfile,
}

impl ResolveRequest {
    pub fn new(mode: ResolveMode, query: AttributeProfile) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            mode,
            query,
        }
    }

    pub fn standalone(query: AttributeProfile) -> Self {
        Self::new(ResolveMode::Standalone, query)
    }

    pub fn embedded(query: AttributeProfile) -> Self {
        Self::new(ResolveMode::Embedded, query)
    }

    /// Build a request from a caller context.
    ///
    /// If the context marks the call as internal, the query is read from the
    /// context's `host`, `account` and `user` keys. Otherwise `params` is used.
    pub fn from_context(context: &HashMap<String, String>, params: AttributeProfile) -> Self {
        let internal = context
            .get(KEY_INTERNAL)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        if internal {
            Self::embedded(AttributeProfile::from_context(context))
        } else {
            Self::standalone(params)
        }
    }
}
