//! Key-value persistence layer for meterlog.
//!
//! All persistent state lives as JSON text under three fixed keys (see
//! [`keys`]): the meter collection, the reading collection, and the
//! cost-settings record. The [`KvStore`] trait is that contract; the
//! [`Repository`] layers collection semantics on top of any implementation
//! and drives validation on the write path.
//!
//! # Backends
//!
//! - [`RocksKv`]: on-disk store (default `rocksdb-backend` feature)
//! - [`MemoryKv`]: in-memory store for tests
//!
//! # Example
//!
//! ```no_run
//! use meterlog_core::{Meter, MeterType};
//! use meterlog_store::{Repository, RocksKv};
//!
//! let store = RocksKv::open("/tmp/meterlog-db").unwrap();
//! let repo = Repository::new(store);
//!
//! let meter = Meter::new(
//!     "Main".into(),
//!     MeterType::Electricity,
//!     "E-1001".into(),
//!     "kWh".into(),
//! );
//! repo.save_meter(&meter).unwrap();
//!
//! let meters = repo.meters().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
pub mod repo;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;

pub use error::{RepoError, Result, StoreError};
pub use memory::MemoryKv;
pub use repo::Repository;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksKv;

/// The key-value store contract the rest of the crate is written against.
///
/// Keys are the fixed names in [`keys`]; values are JSON text. The store is
/// synchronous and local; implementations do no locking or versioning, so
/// concurrent writers are last-write-wins.
pub trait KvStore: Send + Sync {
    /// Read the value under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn remove(&self, key: &str) -> Result<()>;
}
