use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use rocksdb::{Options, WriteOptions, DB};
use tracing::debug;

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;

/// Durable set of fingerprints that were already turned into notes.
pub trait DedupStore {
    /// Value stored under `key`, `None` when the key was never recorded.
    fn lookup(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key` and returns only once the write is durable.
    fn record(&self, key: &Fingerprint, value: &[u8]) -> Result<(), StoreError>;
}

pub struct RocksStore {
    db: DB,
    path: PathBuf,
}

impl RocksStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, &path)?;
        debug!(path = %path.display(), "dedup store opened");
        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DedupStore for RocksStore {
    fn lookup(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?)
    }

    fn record(&self, key: &Fingerprint, value: &[u8]) -> Result<(), StoreError> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(true);
        self.db.put_opt(key, value, &write_opts)?;
        Ok(())
    }
}

/// Volatile store, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<Fingerprint, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DedupStore for MemoryStore {
    fn lookup(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.get(key).cloned())
    }

    fn record(&self, key: &Fingerprint, value: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.insert(*key, value.to_vec());
        Ok(())
    }
}

impl<S: DedupStore + ?Sized> DedupStore for &S {
    fn lookup(&self, key: &Fingerprint) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).lookup(key)
    }

    fn record(&self, key: &Fingerprint, value: &[u8]) -> Result<(), StoreError> {
        (**self).record(key, value)
    }
}
