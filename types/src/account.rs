//! Account identity and history records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CommunityId, Timestamp};

/// A platform account name, stored without any `u/` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountHandle(String);

impl AccountHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountHandle {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountHandle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A resolved account, as reported by the platform directory.
///
/// A handle that does not resolve to an account at all is signalled by the
/// directory as a not-found fault rather than by a flag here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub handle: AccountHandle,
    /// When the account was registered on the platform.
    pub created: Timestamp,
    /// Whether the platform has suspended the account site-wide.
    pub suspended: bool,
}

/// A single comment from an account's history. Immutable, externally sourced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    /// The community the comment was posted in.
    pub community: CommunityId,
    pub created: Timestamp,
    /// Aggregate community-assigned score. May be negative.
    pub score: i64,
}
