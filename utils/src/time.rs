//! Time helpers for retry scheduling.

use modgate_types::Timestamp;

/// Seconds until the top of the next hour. Always in `1..=3600`.
///
/// The platform resets its grant rate limit on the hour, so queued grants
/// are retried then rather than on a fixed backoff.
pub fn seconds_to_next_hour(now: Timestamp) -> u64 {
    3600 - (now.as_secs() % 3600)
}
