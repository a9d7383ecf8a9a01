//! Migration-specific error types.

use crate::schema::SchemaError;
use thiserror::Error;

/// Migration-specific errors.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A schema operation failed in a way the step cannot continue from.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A step's precondition does not hold.
    #[error("precondition failed for {step_id}: {message}")]
    PreconditionFailed {
        /// The step whose precondition failed.
        step_id: String,
        /// What was missing.
        message: String,
    },

    /// Steps are not in strictly increasing id order.
    #[error("step {step_id} must come after {previous}")]
    StepOrder {
        /// The out-of-order step.
        step_id: String,
        /// The step listed before it.
        previous: String,
    },

    /// Steps are one-way.
    #[error("{step_id} cannot be reverted")]
    RevertUnsupported {
        /// The step that was asked to revert.
        step_id: String,
    },

    /// No step with the given id is known.
    #[error("unknown migration step: {step_id}")]
    UnknownStep {
        /// The requested id.
        step_id: String,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] crate::error::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}
