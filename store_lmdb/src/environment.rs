//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// Map size. Rows are short report texts keyed by handle, so this is ample.
const MAP_SIZE: usize = 16 * 1024 * 1024;
const MAX_DBS: u32 = 1;

/// Wraps the LMDB environment and the grant-queue database handle.
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) grants_db: Database<Str, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {e}", path.display())))?;
        let env = unsafe {
            EnvOpenOptions::new()
                .max_dbs(MAX_DBS)
                .map_size(MAP_SIZE)
                .open(path)?
        };
        let mut wtxn = env.write_txn()?;
        let grants_db = env.create_database(&mut wtxn, Some("grants"))?;
        wtxn.commit()?;
        Ok(Self {
            env: Arc::new(env),
            grants_db,
        })
    }
}
