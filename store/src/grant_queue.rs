//! Contributor-grant retry queue storage trait.

use modgate_types::{AccountHandle, Timestamp};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// A contributor grant that could not be applied yet.
///
/// Created when the platform rate-limits the grant call; the already-rendered
/// report text rides along so the retry never has to re-run verification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueuedGrant {
    pub handle: AccountHandle,
    pub report: String,
    pub created_at: Timestamp,
}

/// Trait for persisting queued contributor grants.
///
/// Keyed uniquely by account handle: at most one outstanding grant per
/// handle. Implementations must make each mutation all-or-nothing so that two
/// overlapping schedulers never observe a partial write.
pub trait GrantQueueStore {
    /// Insert a queued grant if no grant for the handle exists.
    ///
    /// A duplicate handle is rejected with [`StoreError::Duplicate`], never
    /// merged silently.
    fn enqueue(&self, grant: &QueuedGrant) -> Result<(), StoreError>;

    /// Fetch the next pending grant, if any.
    fn next_pending(&self) -> Result<Option<QueuedGrant>, StoreError>;

    /// Delete the queued grant for a handle (once it has been applied).
    fn remove(&self, handle: &AccountHandle) -> Result<(), StoreError>;

    /// Number of grants currently queued.
    fn pending_count(&self) -> Result<u64, StoreError>;
}
