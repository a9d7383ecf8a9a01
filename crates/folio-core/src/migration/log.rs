//! Per-entity progress log of a migration step.
//!
//! Every outcome is both kept in the step's [`ProgressLog`] and emitted as a
//! `tracing` event, so the report and the log stream tell the same story.

use crate::schema::{EntityKind, SchemaError};
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::fmt;
use tracing::{error, info, warn};

/// What happened to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerdeSerialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Updated,
    Removed,
    Skipped,
    Failed,
}

impl Outcome {
    /// Marker printed before the entry.
    pub fn marker(self) -> &'static str {
        match self {
            Outcome::Created | Outcome::Removed => "✓",
            Outcome::Updated => "-",
            Outcome::Skipped => "⊘",
            Outcome::Failed => "✗",
        }
    }
}

/// One line of a step's progress log.
#[derive(Debug, Clone, PartialEq, Eq, SerdeSerialize)]
pub struct LogEntry {
    pub outcome: Outcome,
    pub kind: EntityKind,
    /// Handle or title of the entity.
    pub label: String,
    /// Reason for a skip or failure, or what was updated.
    pub detail: Option<String>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.outcome {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Removed => "removed",
            Outcome::Skipped => "skipped",
            Outcome::Failed => "failed",
        };
        write!(f, "{} {} {} `{}`", self.outcome.marker(), verb, self.kind, self.label)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Outcome totals of a step.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct LogCounts {
    pub created: u32,
    pub updated: u32,
    pub removed: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// Progress log of one step.
#[derive(Debug, Clone, Default, SerdeSerialize)]
pub struct ProgressLog {
    step: String,
    entries: Vec<LogEntry>,
}

impl ProgressLog {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            entries: Vec::new(),
        }
    }

    pub fn created(&mut self, kind: EntityKind, label: impl Into<String>) {
        let label = label.into();
        info!(step = %self.step, %kind, label = %label, "✓ created");
        self.push(Outcome::Created, kind, label, None);
    }

    pub fn updated(&mut self, kind: EntityKind, label: impl Into<String>, detail: impl Into<String>) {
        let (label, detail) = (label.into(), detail.into());
        info!(step = %self.step, %kind, label = %label, detail = %detail, "- updated");
        self.push(Outcome::Updated, kind, label, Some(detail));
    }

    pub fn removed(&mut self, kind: EntityKind, label: impl Into<String>) {
        let label = label.into();
        info!(step = %self.step, %kind, label = %label, "✓ removed");
        self.push(Outcome::Removed, kind, label, None);
    }

    pub fn skipped(&mut self, kind: EntityKind, label: impl Into<String>, reason: impl Into<String>) {
        let (label, reason) = (label.into(), reason.into());
        warn!(step = %self.step, %kind, label = %label, reason = %reason, "⊘ skipped");
        self.push(Outcome::Skipped, kind, label, Some(reason));
    }

    pub fn failed(&mut self, kind: EntityKind, label: impl Into<String>, error: impl fmt::Display) {
        let (label, error) = (label.into(), error.to_string());
        error!(step = %self.step, %kind, label = %label, error = %error, "✗ failed");
        self.push(Outcome::Failed, kind, label, Some(error));
    }

    /// Log a creation result: created on `Ok`, failed on `Err`.
    pub fn record<T>(&mut self, kind: EntityKind, label: &str, result: Result<T, SchemaError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.created(kind, label);
                Some(value)
            }
            Err(e) => {
                self.failed(kind, label, e);
                None
            }
        }
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn counts(&self) -> LogCounts {
        let mut counts = LogCounts::default();
        for entry in &self.entries {
            match entry.outcome {
                Outcome::Created => counts.created += 1,
                Outcome::Updated => counts.updated += 1,
                Outcome::Removed => counts.removed += 1,
                Outcome::Skipped => counts.skipped += 1,
                Outcome::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| e.outcome == Outcome::Failed)
    }

    fn push(&mut self, outcome: Outcome, kind: EntityKind, label: String, detail: Option<String>) {
        self.entries.push(LogEntry {
            outcome,
            kind,
            label,
            detail,
        });
    }
}

impl fmt::Display for ProgressLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "  {entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_and_counts() {
        let mut log = ProgressLog::new("m251018_130000_add_us_states");
        log.created(EntityKind::Category, "Ohio");
        log.skipped(EntityKind::Category, "Massachusetts", "already exists");
        log.failed(EntityKind::Category, "Nowhere", "Title cannot be blank.");
        log.updated(EntityKind::EntryType, "album", "added locations");

        let lines: Vec<String> = log.entries().iter().map(|e| e.to_string()).collect();
        assert_eq!(lines[0], "✓ created category `Ohio`");
        assert_eq!(lines[1], "⊘ skipped category `Massachusetts`: already exists");
        assert_eq!(lines[2], "✗ failed category `Nowhere`: Title cannot be blank.");
        assert_eq!(lines[3], "- updated entry type `album`: added locations");

        let counts = log.counts();
        assert_eq!((counts.created, counts.skipped, counts.failed, counts.updated), (1, 1, 1, 1));
        assert!(log.has_failures());
    }

    #[test]
    fn test_record() {
        let mut log = ProgressLog::new("step");
        assert_eq!(log.record(EntityKind::Field, "camera", Ok(3)), Some(3));
        let err = SchemaError::DuplicateHandle {
            kind: EntityKind::Field,
            handle: "camera".into(),
        };
        assert_eq!(log.record::<u32>(EntityKind::Field, "camera", Err(err)), None);
        assert_eq!(log.counts().failed, 1);
    }
}
