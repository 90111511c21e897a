//! Account review lifecycle: validation and execution of transitions.
//!
//! [`plan_transition`] is pure and decides whether an action is legal for an
//! account's current state. [`LifecycleService`] adds the caller check, loads
//! the account and hands the plan to the repository, which commits the
//! account update and its status log entry atomically.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::error::LifecycleError;
use crate::models::{
    account::{
        Account, AccountDetailResponse, AccountListQuery, AvailableActionsResponse,
        RegisterAccountRequest, TransitionOutcome, UpdateProfileRequest,
    },
    caller::Caller,
    lifecycle::{Action, LifecycleState, ResultingState},
    status_log::StatusLogEntry,
    PageRequest, PaginatedResponse,
};
use crate::repositories::account_repository::{AccountRepositoryTrait, TransitionCommit};
use crate::services::authorizer::{authorized_actions_for, reason_required};
use crate::types::AccountId;
use crate::utils::time::now_utc;

pub const MAX_REASON_LENGTH: usize = 500;

/// Trims a reason. Blank input becomes `None`; overly long input is rejected.
pub fn normalize_reason(reason: Option<&str>) -> Result<Option<String>, LifecycleError> {
    let Some(trimmed) = reason.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > MAX_REASON_LENGTH {
        return Err(LifecycleError::ReasonTooLong {
            max: MAX_REASON_LENGTH,
        });
    }
    Ok(Some(trimmed.to_string()))
}

/// A validated transition, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub action: Action,
    pub next_state: LifecycleState,
    pub next_active: bool,
    pub resulting_state: ResultingState,
    pub reason: Option<String>,
}

/// Checks legality first, then the reason.
pub fn plan_transition(
    account: &Account,
    action: Action,
    reason: Option<&str>,
) -> Result<TransitionPlan, LifecycleError> {
    let state = account.lifecycle_state;
    let is_active = account.is_active;

    let (next_state, next_active) = match (action, state, is_active) {
        (Action::Approve, LifecycleState::PendingReview, active) => {
            (LifecycleState::Approved, active)
        }
        (Action::Reject, LifecycleState::PendingReview, active) => {
            (LifecycleState::Rejected, active)
        }
        (Action::Activate, LifecycleState::Approved, false) => (LifecycleState::Approved, true),
        (Action::Deactivate, LifecycleState::Approved, true) => (LifecycleState::Approved, false),
        _ => {
            return Err(LifecycleError::IllegalTransition {
                action,
                state,
                is_active,
            })
        }
    };

    let reason = normalize_reason(reason)?;
    if action.requires_reason() && reason.is_none() {
        return Err(LifecycleError::MissingReason(action));
    }

    Ok(TransitionPlan {
        action,
        next_state,
        next_active,
        resulting_state: action.resulting_state(),
        reason,
    })
}

#[derive(Clone)]
pub struct LifecycleService {
    repository: Arc<dyn AccountRepositoryTrait>,
    time_zone: Tz,
}

impl LifecycleService {
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>, time_zone: Tz) -> Self {
        Self {
            repository,
            time_zone,
        }
    }

    fn ensure_review_authority(caller: &Caller) -> Result<(), LifecycleError> {
        if caller.role.has_review_authority() {
            Ok(())
        } else {
            Err(LifecycleError::Unauthorized)
        }
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Account, LifecycleError> {
        self.repository.find_by_id(id).await
    }

    /// Account, its history, and the actions this caller may offer.
    pub async fn account_detail(
        &self,
        caller: &Caller,
        id: AccountId,
    ) -> Result<AccountDetailResponse, LifecycleError> {
        let account = self.repository.find_by_id(id).await?;
        let status_logs = self.repository.status_logs(id).await?;
        let actions = authorized_actions_for(caller.role, &account);
        Ok(AccountDetailResponse {
            reason_required: reason_required(&actions),
            available_actions: actions.into_iter().collect(),
            account,
            status_logs,
        })
    }

    pub async fn list_accounts(
        &self,
        query: &AccountListQuery,
    ) -> Result<PaginatedResponse<Account>, LifecycleError> {
        let page = PageRequest::new(query.page, query.page_size);
        let (items, total) = self
            .repository
            .list(&query.filter(), page.limit(), page.offset())
            .await?;
        Ok(PaginatedResponse::new(items, total, page))
    }

    pub async fn status_logs(&self, id: AccountId) -> Result<Vec<StatusLogEntry>, LifecycleError> {
        // unknown accounts are NotFound rather than an empty history
        self.repository.find_by_id(id).await?;
        self.repository.status_logs(id).await
    }

    pub async fn authorized_actions(
        &self,
        caller: &Caller,
        id: AccountId,
    ) -> Result<AvailableActionsResponse, LifecycleError> {
        let account = self.repository.find_by_id(id).await?;
        let actions = authorized_actions_for(caller.role, &account);
        Ok(AvailableActionsResponse {
            account_id: account.id,
            lifecycle_state: account.lifecycle_state,
            is_active: account.is_active,
            version: account.version,
            reason_required: reason_required(&actions),
            available_actions: actions.into_iter().collect(),
        })
    }

    /// Registers a new account in `PendingReview`. Writes no log entry.
    pub async fn register(
        &self,
        caller: &Caller,
        request: RegisterAccountRequest,
    ) -> Result<Account, LifecycleError> {
        Self::ensure_review_authority(caller)?;
        let account = Account::new(request.kind, request.profile, now_utc(&self.time_zone));
        let created = self.repository.create(&account).await?;
        tracing::info!(
            account_id = %created.id,
            kind = created.kind.as_str(),
            actor_id = %caller.id,
            "account registered"
        );
        Ok(created)
    }

    /// Edits profile fields only; lifecycle fields are never touched.
    pub async fn update_profile(
        &self,
        caller: &Caller,
        id: AccountId,
        request: UpdateProfileRequest,
    ) -> Result<Account, LifecycleError> {
        Self::ensure_review_authority(caller)?;
        let updated = self
            .repository
            .update_profile(
                id,
                request.expected_version,
                &request.profile,
                now_utc(&self.time_zone),
            )
            .await?;
        tracing::info!(account_id = %id, actor_id = %caller.id, version = updated.version, "profile updated");
        Ok(updated)
    }

    /// Validates and commits one transition against the current state.
    pub async fn apply_transition(
        &self,
        caller: &Caller,
        id: AccountId,
        action: Action,
        reason: Option<&str>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply_versioned_transition(caller, id, None, action, reason)
            .await
    }

    /// Validates and commits one transition.
    ///
    /// Checks run in order: caller authority, account existence, the version
    /// the reviewer saw, legality, reason. Any failure leaves the account and
    /// its log untouched.
    pub async fn apply_versioned_transition(
        &self,
        caller: &Caller,
        id: AccountId,
        expected_version: Option<i64>,
        action: Action,
        reason: Option<&str>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let result = self
            .try_apply_transition(caller, id, expected_version, action, reason)
            .await;
        match &result {
            Ok(outcome) => tracing::info!(
                account_id = %id,
                action = %action,
                actor_id = %caller.id,
                lifecycle_state = %outcome.account.lifecycle_state,
                is_active = outcome.account.is_active,
                "transition applied"
            ),
            Err(LifecycleError::Storage(err)) => tracing::error!(
                account_id = %id,
                action = %action,
                actor_id = %caller.id,
                error = ?err,
                "transition failed"
            ),
            Err(err) => tracing::warn!(
                account_id = %id,
                action = %action,
                actor_id = %caller.id,
                code = err.code(),
                "transition refused: {}",
                err
            ),
        }
        result
    }

    async fn try_apply_transition(
        &self,
        caller: &Caller,
        id: AccountId,
        expected_version: Option<i64>,
        action: Action,
        reason: Option<&str>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        Self::ensure_review_authority(caller)?;
        let account = self.repository.find_by_id(id).await?;
        if expected_version.is_some_and(|seen| seen != account.version) {
            return Err(LifecycleError::Conflict(account.id));
        }
        let plan = plan_transition(&account, action, reason)?;

        let entry = StatusLogEntry::transition(
            account.id,
            plan.resulting_state,
            plan.reason,
            Some(caller.id),
            now_utc(&self.time_zone),
        );
        let commit = TransitionCommit {
            account_id: account.id,
            expected_version: account.version,
            next_state: plan.next_state,
            next_active: plan.next_active,
            entry,
        };
        let account = self.repository.commit_transition(&commit).await?;

        Ok(TransitionOutcome {
            account,
            new_log_entry: commit.entry,
        })
    }
}
