//! Migration history persistence.
//!
//! Records which steps ran, when, and how they ended, so applied steps are
//! never run twice.

use super::error::MigrationError;
use super::log::LogCounts;
use crate::store::current_timestamp;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Recorded status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step not yet run.
    Pending,
    /// Step ran to completion.
    Applied,
    /// Step failed; it will be attempted again on the next run.
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Applied => write!(f, "applied"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

/// History entry of one step.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize)]
pub struct StepRecord {
    /// Step identifier.
    pub step_id: String,
    /// Current status.
    pub status: StepStatus,
    /// When the last attempt started (milliseconds since epoch).
    pub started_at: Option<u64>,
    /// When the last attempt ended (milliseconds since epoch).
    pub completed_at: Option<u64>,
    /// Schema version after the last attempt.
    pub schema_version: u64,
    /// Error of the last failed attempt.
    pub error: Option<String>,
    /// Outcome totals of the last attempt.
    pub counts: LogCounts,
}

impl StepRecord {
    /// Create a pending record.
    pub fn new(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            schema_version: 0,
            error: None,
            counts: LogCounts::default(),
        }
    }

    /// Mark the step as started.
    pub fn start(&mut self) {
        self.status = StepStatus::Pending;
        self.started_at = Some(current_timestamp());
        self.completed_at = None;
        self.error = None;
    }

    /// Mark the step as applied.
    pub fn complete(&mut self, schema_version: u64, counts: LogCounts) {
        self.status = StepStatus::Applied;
        self.completed_at = Some(current_timestamp());
        self.schema_version = schema_version;
        self.counts = counts;
    }

    /// Mark the step as failed.
    pub fn fail(&mut self, schema_version: u64, counts: LogCounts, error: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.completed_at = Some(current_timestamp());
        self.schema_version = schema_version;
        self.counts = counts;
        self.error = Some(error.into());
    }

    /// Duration of the last attempt in milliseconds.
    pub fn duration_ms(&self) -> Option<u64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }

    /// Serialize the record to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MigrationError> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| MigrationError::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MigrationError> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| MigrationError::Deserialization(e.to_string()))
    }
}

/// Step history store.
pub struct MigrationStateStore {
    tree: sled::Tree,
}

impl MigrationStateStore {
    /// Tree name for migration history.
    pub const TREE_NAME: &'static str = "migration:state";

    /// Open or create the history store.
    pub fn open(db: &sled::Db) -> Result<Self, MigrationError> {
        let tree = db
            .open_tree(Self::TREE_NAME)
            .map_err(|e| MigrationError::Storage(crate::error::Error::Storage(e)))?;
        Ok(Self { tree })
    }

    /// Save a step record.
    pub fn save(&self, record: &StepRecord) -> Result<(), MigrationError> {
        let value = record.to_bytes()?;
        self.tree
            .insert(Self::step_key(&record.step_id), value)
            .map_err(|e| MigrationError::Storage(crate::error::Error::Storage(e)))?;
        Ok(())
    }

    /// Load a step record.
    pub fn load(&self, step_id: &str) -> Result<Option<StepRecord>, MigrationError> {
        match self
            .tree
            .get(Self::step_key(step_id))
            .map_err(|e| MigrationError::Storage(crate::error::Error::Storage(e)))?
        {
            Some(bytes) => Ok(Some(StepRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Check if a step has been applied.
    pub fn is_applied(&self, step_id: &str) -> Result<bool, MigrationError> {
        Ok(self
            .load(step_id)?
            .is_some_and(|r| r.status == StepStatus::Applied))
    }

    /// All records, ordered by step id.
    pub fn list(&self) -> Result<Vec<StepRecord>, MigrationError> {
        let mut records = Vec::new();
        for result in self.tree.scan_prefix(b"step:") {
            let (_, value) =
                result.map_err(|e| MigrationError::Storage(crate::error::Error::Storage(e)))?;
            records.push(StepRecord::from_bytes(&value)?);
        }
        Ok(records)
    }

    /// Flush changes to disk.
    pub fn flush(&self) -> Result<(), MigrationError> {
        self.tree
            .flush()
            .map_err(|e| MigrationError::Storage(crate::error::Error::Storage(e)))?;
        Ok(())
    }

    fn step_key(step_id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(5 + step_id.len());
        key.extend_from_slice(b"step:");
        key.extend_from_slice(step_id.as_bytes());
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> sled::Db {
        sled::Config::new().temporary(true).open().unwrap()
    }

    #[test]
    fn test_record_lifecycle() {
        let mut record = StepRecord::new("m251018_120000_add_locations");
        assert_eq!(record.status, StepStatus::Pending);

        record.start();
        assert!(record.started_at.is_some());

        let counts = LogCounts {
            created: 2,
            ..Default::default()
        };
        record.complete(12, counts);
        assert_eq!(record.status, StepStatus::Applied);
        assert_eq!(record.schema_version, 12);
        assert_eq!(record.counts.created, 2);
        assert!(record.duration_ms().is_some());
    }

    #[test]
    fn test_save_load_list() {
        let store = MigrationStateStore::open(&test_db()).unwrap();
        assert!(store.list().unwrap().is_empty());

        let mut second = StepRecord::new("m2");
        second.start();
        second.fail(3, LogCounts::default(), "section `travels` not found");
        store.save(&second).unwrap();

        let mut first = StepRecord::new("m1");
        first.start();
        first.complete(2, LogCounts::default());
        store.save(&first).unwrap();

        assert!(store.is_applied("m1").unwrap());
        assert!(!store.is_applied("m2").unwrap());
        assert!(!store.is_applied("m3").unwrap());

        let loaded = store.load("m2").unwrap().unwrap();
        assert_eq!(loaded, second);

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|r| r.step_id).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }
}
