//! Moderator-authored annotations on an account.

use serde::{Deserialize, Serialize};

/// Note kinds that gate verification.
///
/// The kind set is open-ended (moderation tooling keeps growing it), so kinds
/// stay plain strings. Every kind is tallied; only these two gate the verdict.
pub mod note_kind {
    pub const BAN: &str = "BAN";
    pub const MUTE: &str = "MUTE";
}

/// A moderation note attached to one account within one community.
///
/// Notes are immutable historical records created by moderators outside this
/// system. Observed kinds include `BAN`, `MUTE`, `APPROVAL`, and `REMOVAL`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModNote {
    pub kind: String,
}

impl ModNote {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}
