//! Ordered, one-way schema migrations.
//!
//! A run visits steps in ascending id order. Each step checks its
//! preconditions, applies its changes through the schema managers and logs
//! every entity it touches. Applied steps are recorded and never run again;
//! nothing is ever rolled back.

mod error;
mod log;
mod runner;
mod state;
mod step;

pub use error::MigrationError;
pub use log::{LogCounts, LogEntry, Outcome, ProgressLog};
pub use runner::{MigrationRunner, RunReport, RunStatus, RunnerConfig, StepReport};
pub use state::{MigrationStateStore, StepRecord, StepStatus};
pub use step::{MigrationStep, Precondition, RevertOutcome, StepContext};
