//! Host/account/user attribute profiles
//!
//! A profile is used both as the query side of a resolution and as the
//! descriptor of every stored credential. Matching counts the slots on which
//! both sides carry a value and those values agree, ignoring case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Context keys recognized when a profile is read from a key-value bag
pub const KEY_HOST: &str = "host";
pub const KEY_ACCOUNT: &str = "account";
pub const KEY_USER: &str = "user";

/// Triple of optional attributes identifying a deployment target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

impl AttributeProfile {
    /// Create a profile; omitted attributes are stored as absent
    pub fn new(host: Option<String>, account: Option<String>, user: Option<String>) -> Self {
        Self {
            host,
            account,
            user,
        }
    }

    /// Create a profile with no attributes set
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Read the three attributes from a key-value context.
    ///
    /// A missing key yields an absent attribute. Values are taken verbatim.
    pub fn from_context(context: &HashMap<String, String>) -> Self {
        Self {
            host: context.get(KEY_HOST).cloned(),
            account: context.get(KEY_ACCOUNT).cloned(),
            user: context.get(KEY_USER).cloned(),
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// True if at least one attribute is present
    pub fn has_any_value(&self) -> bool {
        self.host.is_some() || self.account.is_some() || self.user.is_some()
    }

    /// Count the attribute slots on which both profiles agree.
    ///
    /// A slot contributes 1 only when both sides have a value and the values
    /// are equal ignoring case. A profile without any value never matches.
    pub fn compare(&self, other: &AttributeProfile) -> usize {
        if !other.has_any_value() {
            return 0;
        }

        [
            (self.host(), other.host()),
            (self.account(), other.account()),
            (self.user(), other.user()),
        ]
        .into_iter()
        .filter(|(ours, theirs)| match (ours, theirs) {
            (Some(a), Some(b)) => eq_ignore_case(a, b),
            _ => false,
        })
        .count()
    }
}

/// Case-insensitive equality, one char at a time.
///
/// Two chars agree when they are equal, when their uppercase forms are
/// equal, or when the lowercase forms of their uppercase forms are equal.
/// Both strings must have the same number of chars.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| {
            if x == y {
                return true;
            }
            let (x, y) = (simple_upper(x), simple_upper(y));
            x == y || simple_lower(x) == simple_lower(y)
        })
}

/// Single-char uppercase mapping; chars expanding to several keep their form
fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Single-char lowercase mapping; `İ` expands to `i` plus a combining dot
/// and maps to `i`
fn simple_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

impl fmt::Display for AttributeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host={} account={} user={}",
            self.host().unwrap_or("-"),
            self.account().unwrap_or("-"),
            self.user().unwrap_or("-"),
        )
    }
}
