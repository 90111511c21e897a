use thiserror::Error;

use crate::models::lifecycle::{Action, LifecycleState};
use crate::types::AccountId;

/// Failure kinds of lifecycle reads and transitions.
///
/// Every variant aborts the operation as a whole: no account update and no
/// status log entry is written.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("action `{action}` is not available for an account that is {state} (active: {is_active})")]
    IllegalTransition {
        action: Action,
        state: LifecycleState,
        is_active: bool,
    },

    #[error("a reason is required to {0}")]
    MissingReason(Action),

    #[error("reason must be at most {max} characters")]
    ReasonTooLong { max: usize },

    #[error("caller is not allowed to review accounts")]
    Unauthorized,

    #[error("account {0} not found")]
    NotFound(AccountId),

    #[error("account {0} was changed concurrently; refresh and retry")]
    Conflict(AccountId),

    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl LifecycleError {
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            LifecycleError::MissingReason(_) => "MISSING_REASON",
            LifecycleError::ReasonTooLong { .. } => "VALIDATION_ERROR",
            LifecycleError::Unauthorized => "FORBIDDEN",
            LifecycleError::NotFound(_) => "NOT_FOUND",
            LifecycleError::Conflict(_) => "CONFLICT",
            LifecycleError::Storage(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<sqlx::Error> for LifecycleError {
    fn from(err: sqlx::Error) -> Self {
        LifecycleError::Storage(err.into())
    }
}
