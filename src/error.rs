//! Error types for the scheduling core.
//!
//! A detected conflict is not an error: it is reported through
//! [`ToggleOutcome::Conflict`](crate::services::pool::ToggleOutcome) and
//! suspends the mutation until the caller confirms or cancels.

use crate::models::course::{CourseValidationError, GroupId};

/// Errors returned by pool and planner operations. None are fatal; each one
/// rejects a single operation and leaves the schedule unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// Malformed course input
    #[error("invalid course: {0}")]
    Validation(#[from] CourseValidationError),

    /// The referenced course group does not exist
    #[error("course {0} not found")]
    NotFound(GroupId),

    /// A group with this id is already in the pool
    #[error("course {0} already exists")]
    DuplicateId(GroupId),

    /// Confirm was requested with nothing awaiting confirmation
    #[error("no conflict is awaiting confirmation")]
    NoPendingOverride,

    /// Confirm was requested for a different course than the pending one
    #[error("course {requested} is not awaiting confirmation (pending: {pending})")]
    PendingMismatch {
        /// Candidate of the pending override
        pending: GroupId,
        /// Group the caller tried to confirm
        requested: GroupId,
    },

    /// The persistence collaborator rejected a change; nothing was applied
    #[error("save failed: {0}")]
    SaveFailed(String),

    /// Stored courses could not be read
    #[error("load failed: {0}")]
    LoadFailed(String),
}

impl ScheduleError {
    /// Warnings are surfaced to the user but are not input mistakes.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NoPendingOverride)
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
