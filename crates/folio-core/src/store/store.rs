//! Versioned schema snapshots over sled.

use super::{current_timestamp, StoreConfig};
use crate::catalog::SchemaBundle;
use crate::error::Error;
use parking_lot::RwLock;
use sled::{Db, Tree};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Tree name for schema snapshots, keyed by big-endian version.
const SNAPSHOT_TREE: &str = "schema:snapshots";

/// Tree name for store metadata.
const META_TREE: &str = "schema:meta";

/// Key for the current version in the meta tree.
const CURRENT_VERSION_KEY: &[u8] = b"current_version";

/// The schema store.
///
/// Holds the current [`SchemaBundle`] in memory and every committed version on
/// disk. All mutation goes through [`SchemaStore::update`], which commits a new
/// version only when the closure succeeds.
pub struct SchemaStore {
    db: Db,
    snapshot_tree: Tree,
    meta_tree: Tree,
    current_version: AtomicU64,
    current: RwLock<SchemaBundle>,
}

impl SchemaStore {
    /// Open or create a store.
    pub fn open(config: &StoreConfig) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        Self::from_db(db)
    }

    /// Open a temporary store, removed on drop.
    pub fn temporary() -> Result<Self, Error> {
        Self::open(&StoreConfig::temporary())
    }

    fn from_db(db: Db) -> Result<Self, Error> {
        let snapshot_tree = db.open_tree(SNAPSHOT_TREE)?;
        let meta_tree = db.open_tree(META_TREE)?;

        let current_version = match meta_tree.get(CURRENT_VERSION_KEY)? {
            Some(bytes) => decode_version(&bytes)?,
            None => 0,
        };

        let current = if current_version > 0 {
            let bytes = snapshot_tree
                .get(current_version.to_be_bytes())?
                .ok_or_else(|| {
                    Error::InvalidData(format!("missing snapshot for version {current_version}"))
                })?;
            SchemaBundle::from_bytes(&bytes)?
        } else {
            SchemaBundle::default()
        };

        debug!(version = current_version, "opened schema store");

        Ok(Self {
            db,
            snapshot_tree,
            meta_tree,
            current_version: AtomicU64::new(current_version),
            current: RwLock::new(current),
        })
    }

    /// The current schema version (0 before the first commit).
    pub fn current_version(&self) -> u64 {
        self.current_version.load(Ordering::SeqCst)
    }

    /// A copy of the current schema.
    pub fn snapshot(&self) -> SchemaBundle {
        self.current.read().clone()
    }

    /// Run a read-only closure against the current schema.
    pub fn read<T>(&self, f: impl FnOnce(&SchemaBundle) -> T) -> T {
        f(&self.current.read())
    }

    /// Read-modify-write the schema.
    ///
    /// The closure works on a copy. On `Ok` the copy is committed as the next
    /// version unless it is unchanged; on `Err` nothing changes. The closure
    /// must not call back into the store.
    pub fn update<T, E>(&self, f: impl FnOnce(&mut SchemaBundle) -> Result<T, E>) -> Result<T, E>
    where
        E: From<Error>,
    {
        let mut guard = self.current.write();
        let mut draft = guard.clone();
        let value = f(&mut draft)?;
        if draft == *guard {
            return Ok(value);
        }

        let new_version = self.current_version() + 1;
        draft.version = new_version;
        draft.created_at = current_timestamp();

        let bytes = draft.to_bytes()?;
        self.snapshot_tree
            .insert(new_version.to_be_bytes(), bytes)
            .map_err(Error::from)?;
        self.meta_tree
            .insert(CURRENT_VERSION_KEY, &new_version.to_be_bytes())
            .map_err(Error::from)?;

        self.current_version.store(new_version, Ordering::SeqCst);
        *guard = draft;
        debug!(version = new_version, "committed schema snapshot");
        Ok(value)
    }

    /// Get the snapshot committed as `version`.
    pub fn schema_at_version(&self, version: u64) -> Result<Option<SchemaBundle>, Error> {
        match self.snapshot_tree.get(version.to_be_bytes())? {
            Some(bytes) => Ok(Some(SchemaBundle::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All committed versions in ascending order.
    pub fn list_versions(&self) -> Result<Vec<u64>, Error> {
        self.snapshot_tree
            .iter()
            .keys()
            .map(|key| decode_version(&key?))
            .collect()
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    /// The underlying database, for stores that share it.
    pub fn db(&self) -> &Db {
        &self.db
    }
}

fn decode_version(bytes: &[u8]) -> Result<u64, Error> {
    let buf: [u8; 8] = bytes
        .try_into()
        .map_err(|_| Error::InvalidData(format!("invalid version key of {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(buf))
}
