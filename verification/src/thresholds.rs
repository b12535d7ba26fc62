//! Named eligibility cutoffs.

use modgate_types::time::SECS_PER_DAY;
use modgate_types::Timestamp;
use serde::{Deserialize, Serialize};

/// The reference instants an account's history is judged against.
///
/// Injected into the engine at construction rather than read from the wall
/// clock, so the same inputs always produce the same verdict.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EligibilityThresholds {
    /// Accounts created strictly after this instant are too young.
    pub created: Timestamp,
    /// Oldest in-community activity strictly after this instant demands a
    /// positive karma average.
    pub history: Timestamp,
    /// Oldest in-community activity strictly after this instant fails
    /// outright: no karma track record could have accrued yet.
    pub positive_karma: Timestamp,
}

impl EligibilityThresholds {
    pub fn new(created: Timestamp, history: Timestamp, positive_karma: Timestamp) -> Self {
        Self {
            created,
            history,
            positive_karma,
        }
    }

    /// Build thresholds where the minimum-age cutoff is expressed as
    /// "now minus N days"; the other two cutoffs are fixed policy instants.
    pub fn relative_to(
        now: Timestamp,
        min_account_age_days: u64,
        history: Timestamp,
        positive_karma: Timestamp,
    ) -> Self {
        Self {
            created: now.saturating_sub_secs(min_account_age_days * SECS_PER_DAY),
            history,
            positive_karma,
        }
    }
}
