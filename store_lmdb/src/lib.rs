//! LMDB storage backend for the modgate grant queue.
//!
//! Implements the storage trait from `modgate-store` using the `heed` LMDB
//! bindings. The queue maps to a single LMDB database within one environment.

pub mod environment;
pub mod error;
pub mod grant_queue;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use grant_queue::LmdbGrantQueue;
