//! Account verification engine.
//!
//! Decides whether an account qualifies to post in a community, based on the
//! account's platform status, its moderation-note history there, and its
//! comment history. Pure decision logic over data fetched through an injected
//! [`AccountDirectory`](modgate_platform::AccountDirectory); all thresholds
//! are injected too, so evaluation is deterministic.

pub mod engine;
pub mod error;
pub mod report;
pub mod thresholds;

pub use engine::{Verdict, Verification};
pub use error::VerificationError;
pub use thresholds::EligibilityThresholds;

/// Most-recent comments scanned per evaluation. The backing API reaches no
/// further back, so history beyond this many comments is invisible.
pub const COMMENT_SCAN_LIMIT: usize = 1000;

/// Community rows listed in a report before truncating to the busiest.
pub const COMMUNITIES_SHOWN: usize = 10;
