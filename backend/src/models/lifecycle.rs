//! Review lifecycle vocabulary: states, actions and the outcomes recorded in
//! the status log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Review-outcome axis of an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Registered and awaiting an observer or admin decision.
    #[default]
    PendingReview,
    /// Reviewed and accepted.
    Approved,
    /// Reviewed and declined. No transition leaves this state.
    Rejected,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::PendingReview => "pending_review",
            LifecycleState::Approved => "approved",
            LifecycleState::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Rejected)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer-initiated transition request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Approve,
    Reject,
    Activate,
    Deactivate,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Approve,
        Action::Reject,
        Action::Activate,
        Action::Deactivate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Activate => "activate",
            Action::Deactivate => "deactivate",
        }
    }

    /// Rejecting and deactivating must always carry a non-blank reason.
    pub fn requires_reason(&self) -> bool {
        matches!(self, Action::Reject | Action::Deactivate)
    }

    /// Outcome recorded in the status log when this action succeeds.
    pub fn resulting_state(&self) -> ResultingState {
        match self {
            Action::Approve => ResultingState::Approved,
            Action::Reject => ResultingState::Rejected,
            Action::Activate => ResultingState::Activated,
            Action::Deactivate => ResultingState::Deactivated,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Action::Approve),
            "reject" => Ok(Action::Reject),
            "activate" => Ok(Action::Activate),
            "deactivate" => Ok(Action::Deactivate),
            other => Err(format!("unknown action `{}`", other)),
        }
    }
}

/// Outcome of a transition as stored in the status log.
///
/// Historical rows may carry a free-text status that maps to none of these;
/// such rows keep `resulting_state = NULL` and are rendered from their label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResultingState {
    PendingReview,
    Approved,
    Rejected,
    Activated,
    Deactivated,
}

impl ResultingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultingState::PendingReview => "pending_review",
            ResultingState::Approved => "approved",
            ResultingState::Rejected => "rejected",
            ResultingState::Activated => "activated",
            ResultingState::Deactivated => "deactivated",
        }
    }

    /// Human-readable label stored alongside new entries.
    pub fn default_label(&self) -> &'static str {
        match self {
            ResultingState::PendingReview => "Pending review",
            ResultingState::Approved => "Approved",
            ResultingState::Rejected => "Rejected",
            ResultingState::Activated => "Activated",
            ResultingState::Deactivated => "Deactivated",
        }
    }

    /// Best-effort mapping of a legacy free-text label.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "pending" | "pendingreview" | "underreview" | "new" => {
                Some(ResultingState::PendingReview)
            }
            "approved" | "accepted" | "verified" => Some(ResultingState::Approved),
            "rejected" | "declined" | "refused" => Some(ResultingState::Rejected),
            "activated" | "active" | "enabled" | "reactivated" => Some(ResultingState::Activated),
            "deactivated" | "inactive" | "disabled" | "suspended" => {
                Some(ResultingState::Deactivated)
            }
            _ => None,
        }
    }

    /// Whether an account in `(state, is_active)` is consistent with this
    /// outcome being the latest one applied to it.
    pub fn matches(&self, state: LifecycleState, is_active: bool) -> bool {
        match self {
            ResultingState::PendingReview => state == LifecycleState::PendingReview,
            ResultingState::Approved => state == LifecycleState::Approved,
            ResultingState::Rejected => state == LifecycleState::Rejected,
            ResultingState::Activated => state == LifecycleState::Approved && is_active,
            ResultingState::Deactivated => state == LifecycleState::Approved && !is_active,
        }
    }
}

impl fmt::Display for ResultingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
