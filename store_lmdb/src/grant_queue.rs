//! LMDB implementation of GrantQueueStore.
//!
//! Key: the account handle string. Value: bincode-encoded `QueuedGrant`.
//! Every mutation runs inside a single write transaction, so the
//! existence check in `enqueue` and the subsequent put are atomic.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env};

use modgate_store::{GrantQueueStore, QueuedGrant, StoreError};
use modgate_types::AccountHandle;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct LmdbGrantQueue {
    env: Arc<Env>,
    grants_db: Database<Str, Bytes>,
}

impl LmdbGrantQueue {
    /// Open or create the grant queue under the given directory.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        let environment = LmdbEnvironment::open(path)?;
        Ok(Self {
            env: environment.env,
            grants_db: environment.grants_db,
        })
    }
}

impl GrantQueueStore for LmdbGrantQueue {
    fn enqueue(&self, grant: &QueuedGrant) -> Result<(), StoreError> {
        let bytes = bincode::serialize(grant).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .grants_db
            .get(&wtxn, grant.handle.as_str())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(grant.handle.to_string()));
        }
        self.grants_db
            .put(&mut wtxn, grant.handle.as_str(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn next_pending(&self) -> Result<Option<QueuedGrant>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let entry = self.grants_db.first(&rtxn).map_err(LmdbError::from)?;
        match entry {
            Some((_, bytes)) => {
                let grant: QueuedGrant = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(grant))
            }
            None => Ok(None),
        }
    }

    fn remove(&self, handle: &AccountHandle) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.grants_db
            .delete(&mut wtxn, handle.as_str())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn pending_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.grants_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
