//! Abstract storage trait for the contributor-grant retry queue.
//!
//! Every storage backend (LMDB, in-memory for testing) implements this
//! trait. The rest of the codebase depends only on the trait.

pub mod error;
pub mod grant_queue;

pub use error::StoreError;
pub use grant_queue::{GrantQueueStore, QueuedGrant};
