//! Nullable grant queue — in-memory rows, no filesystem.

use std::cell::RefCell;
use std::collections::BTreeMap;

use modgate_store::{GrantQueueStore, QueuedGrant, StoreError};
use modgate_types::AccountHandle;

#[derive(Default)]
pub struct NullGrantQueue {
    rows: RefCell<BTreeMap<String, QueuedGrant>>,
}

impl NullGrantQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GrantQueueStore for NullGrantQueue {
    fn enqueue(&self, grant: &QueuedGrant) -> Result<(), StoreError> {
        let mut rows = self.rows.borrow_mut();
        let key = grant.handle.as_str().to_string();
        if rows.contains_key(&key) {
            return Err(StoreError::Duplicate(key));
        }
        rows.insert(key, grant.clone());
        Ok(())
    }

    fn next_pending(&self) -> Result<Option<QueuedGrant>, StoreError> {
        Ok(self.rows.borrow().values().next().cloned())
    }

    fn remove(&self, handle: &AccountHandle) -> Result<(), StoreError> {
        self.rows.borrow_mut().remove(handle.as_str());
        Ok(())
    }

    fn pending_count(&self) -> Result<u64, StoreError> {
        Ok(self.rows.borrow().len() as u64)
    }
}
