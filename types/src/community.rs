//! Community identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The name of a community, stored without any `r/` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommunityId(String);

impl CommunityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw community name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommunityId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for CommunityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
