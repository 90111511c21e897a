use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::lifecycle::ResultingState;
use crate::types::{AccountId, OperatorId, StatusLogId};

/// One immutable entry in an account's review history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StatusLogEntry {
    #[schema(value_type = String)]
    pub id: StatusLogId,
    #[schema(value_type = String)]
    pub account_id: AccountId,
    /// `None` for legacy rows whose status text maps to no known outcome.
    pub resulting_state: Option<ResultingState>,
    pub display_label: String,
    pub description: Option<String>,
    /// Reviewer who performed the transition; absent for system entries.
    #[schema(value_type = Option<String>)]
    pub actor_id: Option<OperatorId>,
    pub created_at: DateTime<Utc>,
}

impl StatusLogEntry {
    pub fn transition(
        account_id: AccountId,
        resulting_state: ResultingState,
        description: Option<String>,
        actor_id: Option<OperatorId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: StatusLogId::new(),
            account_id,
            resulting_state: Some(resulting_state),
            display_label: resulting_state.default_label().to_string(),
            description,
            actor_id,
            created_at,
        }
    }

    /// Outcome used for logic: the tagged value when present, otherwise a
    /// best-effort reading of the label.
    pub fn effective_state(&self) -> Option<ResultingState> {
        self.resulting_state
            .or_else(|| ResultingState::from_label(&self.display_label))
    }
}

/// Orders entries most recent first, breaking timestamp ties by id.
pub fn sort_newest_first(entries: &mut [StatusLogEntry]) {
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
