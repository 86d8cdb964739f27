//! `RocksDB` key-value store.
//!
//! Values are UTF-8 JSON text; the key space is the three fixed keys of
//! [`crate::keys`], so a single default column family is enough.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use crate::error::{Result, StoreError};
use crate::KvStore;

/// RocksDB-backed [`KvStore`].
pub struct RocksKv {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksKv {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be opened
    /// or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::open(&opts, path)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl KvStore for RocksKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .get(key.as_bytes())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .put(key.as_bytes(), value.as_bytes())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .delete(key.as_bytes())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::key;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksKv, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksKv::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn get_set_remove() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.get(key::METERS).unwrap(), None);

        store.set(key::METERS, "[]").unwrap();
        assert_eq!(store.get(key::METERS).unwrap().as_deref(), Some("[]"));

        store.remove(key::METERS).unwrap();
        assert_eq!(store.get(key::METERS).unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksKv::open(dir.path()).unwrap();
            store.set(key::COST_SETTINGS, r#"{"electricity":0.4}"#).unwrap();
        }

        let store = RocksKv::open(dir.path()).unwrap();
        assert_eq!(
            store.get(key::COST_SETTINGS).unwrap().as_deref(),
            Some(r#"{"electricity":0.4}"#)
        );
    }
}
