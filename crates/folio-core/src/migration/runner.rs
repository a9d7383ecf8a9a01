//! Migration runner - applies ordered, one-way steps against the schema store.

use super::error::MigrationError;
use super::log::ProgressLog;
use super::state::{MigrationStateStore, StepRecord, StepStatus};
use super::step::{MigrationStep, RevertOutcome, StepContext};
use crate::store::SchemaStore;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Stop the run at the first failed step.
    pub halt_on_failure: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            halt_on_failure: true,
        }
    }
}

/// How a step ended in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Applied during this run.
    Applied,
    /// Recorded as applied by an earlier run; not run again.
    AlreadyApplied,
    /// Precondition unmet or `apply` returned an error.
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Applied => write!(f, "applied"),
            RunStatus::AlreadyApplied => write!(f, "already applied"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step_id: String,
    pub description: String,
    pub status: RunStatus,
    pub log: ProgressLog,
    /// Error that failed the step.
    pub error: Option<String>,
}

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Reports of the steps that were visited, in order.
    pub steps: Vec<StepReport>,
    /// Whether no visited step failed.
    pub passed: bool,
}

impl RunReport {
    /// Number of steps applied during this run.
    pub fn applied(&self) -> usize {
        self.steps.iter().filter(|s| s.status == RunStatus::Applied).count()
    }

    /// The first failed step, if any.
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.status == RunStatus::Failed)
    }
}

/// Applies migration steps in order, each at most once.
pub struct MigrationRunner<'a> {
    store: &'a SchemaStore,
    state: MigrationStateStore,
    config: RunnerConfig,
}

impl<'a> MigrationRunner<'a> {
    /// Create a runner whose history lives next to the schema.
    pub fn new(store: &'a SchemaStore, config: RunnerConfig) -> Result<Self, MigrationError> {
        let state = MigrationStateStore::open(store.db())?;
        Ok(Self {
            store,
            state,
            config,
        })
    }

    /// Check that step ids are strictly increasing.
    pub fn validate_order(steps: &[Box<dyn MigrationStep>]) -> Result<(), MigrationError> {
        for pair in steps.windows(2) {
            if pair[0].id() >= pair[1].id() {
                return Err(MigrationError::StepOrder {
                    step_id: pair[1].id().to_string(),
                    previous: pair[0].id().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Ids of the steps not yet applied.
    pub fn pending(&self, steps: &[Box<dyn MigrationStep>]) -> Result<Vec<&'static str>, MigrationError> {
        let mut pending = Vec::new();
        for step in steps {
            if !self.state.is_applied(step.id())? {
                pending.push(step.id());
            }
        }
        Ok(pending)
    }

    /// Run every pending step in order.
    pub fn run(&self, steps: &[Box<dyn MigrationStep>]) -> Result<RunReport, MigrationError> {
        Self::validate_order(steps)?;

        let mut reports = Vec::with_capacity(steps.len());
        let mut passed = true;
        for step in steps {
            let report = self.run_step(step.as_ref())?;
            let failed = report.status == RunStatus::Failed;
            reports.push(report);
            if failed {
                passed = false;
                if self.config.halt_on_failure {
                    warn!(step = step.id(), "halting run after failed step");
                    break;
                }
            }
        }

        self.state.flush()?;
        self.store.flush()?;
        info!(steps = reports.len(), passed, "migration run finished");
        Ok(RunReport {
            steps: reports,
            passed,
        })
    }

    /// Run one step unless it is already applied.
    #[instrument(skip_all, fields(step = step.id()))]
    pub fn run_step(&self, step: &dyn MigrationStep) -> Result<StepReport, MigrationError> {
        let mut record = self
            .state
            .load(step.id())?
            .unwrap_or_else(|| StepRecord::new(step.id()));

        if record.status == StepStatus::Applied {
            info!("already applied");
            return Ok(StepReport {
                step_id: step.id().to_string(),
                description: step.description().to_string(),
                status: RunStatus::AlreadyApplied,
                log: ProgressLog::new(step.id()),
                error: None,
            });
        }

        info!(description = step.description(), "applying step");
        record.start();
        self.state.save(&record)?;

        let mut ctx = StepContext::new(self.store, step.id());
        let result = self.check_preconditions(step, &mut ctx).and_then(|()| step.apply(&mut ctx));
        let log = ctx.into_log();
        let version = self.store.current_version();

        let (status, error) = match result {
            Ok(()) => {
                record.complete(version, log.counts());
                info!(version, "step applied");
                (RunStatus::Applied, None)
            }
            Err(e) => {
                let message = e.to_string();
                record.fail(version, log.counts(), message.clone());
                error!(error = %message, "step failed");
                (RunStatus::Failed, Some(message))
            }
        };
        self.state.save(&record)?;

        Ok(StepReport {
            step_id: step.id().to_string(),
            description: step.description().to_string(),
            status,
            log,
            error,
        })
    }

    fn check_preconditions(&self, step: &dyn MigrationStep, ctx: &mut StepContext<'_>) -> Result<(), MigrationError> {
        let unmet: Vec<_> = self.store.read(|schema| {
            step.preconditions()
                .into_iter()
                .filter(|p| !p.holds(schema))
                .collect()
        });
        if unmet.is_empty() {
            return Ok(());
        }
        for precondition in &unmet {
            ctx.log().failed(precondition.kind(), precondition.label(), "not found");
        }
        let message = unmet
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(MigrationError::PreconditionFailed {
            step_id: step.id().to_string(),
            message,
        })
    }

    /// Ask a step to revert. Steps are one-way, so this always fails.
    pub fn revert(&self, steps: &[Box<dyn MigrationStep>], step_id: &str) -> Result<(), MigrationError> {
        let step = steps
            .iter()
            .find(|s| s.id() == step_id)
            .ok_or_else(|| MigrationError::UnknownStep {
                step_id: step_id.to_string(),
            })?;
        match step.revert() {
            RevertOutcome::Unsupported => {
                warn!(step = step_id, "revert requested for one-way step");
                Err(MigrationError::RevertUnsupported {
                    step_id: step_id.to_string(),
                })
            }
        }
    }

    /// Recorded history, ordered by step id.
    pub fn history(&self) -> Result<Vec<StepRecord>, MigrationError> {
        self.state.list()
    }

    /// The record of every known step, pending where nothing was recorded.
    pub fn status(&self, steps: &[Box<dyn MigrationStep>]) -> Result<Vec<StepRecord>, MigrationError> {
        steps
            .iter()
            .map(|step| {
                Ok(self
                    .state
                    .load(step.id())?
                    .unwrap_or_else(|| StepRecord::new(step.id())))
            })
            .collect()
    }
}
