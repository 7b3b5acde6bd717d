//! Error types for the resolution engine.

use crate::plan::PlanStatus;

/// Errors that can occur during resolution and plan approval.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// Dice parameters or a dice formula are malformed.
    #[error("invalid roll spec: {0}")]
    InvalidRollSpec(String),

    /// A derived value was read before its roll was evaluated.
    #[error("not evaluated: {0}")]
    NotEvaluated(String),

    /// A plan proposal was asked to make an illegal state change.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// The status the proposal was in.
        from: PlanStatus,
        /// The status that was requested.
        to: PlanStatus,
    },

    /// A test's inputs were changed after its roll was evaluated.
    #[error("resolution frozen: {0}")]
    ResolutionFrozen(String),

    /// The mechanics configuration is malformed.
    #[error("invalid mechanics config: {0}")]
    InvalidConfig(String),

    /// A proposal file could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
