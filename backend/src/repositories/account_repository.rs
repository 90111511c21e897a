//! Account repository trait for dependency injection and testing.
//!
//! The lifecycle service only talks to storage through this trait, which can
//! be mocked using mockall.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::LifecycleError;
use crate::models::{
    account::{Account, AccountFilter, AccountProfile},
    lifecycle::LifecycleState,
    status_log::StatusLogEntry,
};
use crate::types::AccountId;

/// A planned transition ready to be persisted.
///
/// Storage applies it only if the account is still at `expected_version`,
/// and writes the account update and the log entry together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionCommit {
    pub account_id: AccountId,
    pub expected_version: i64,
    pub next_state: LifecycleState,
    pub next_active: bool,
    pub entry: StatusLogEntry,
}

impl TransitionCommit {
    pub fn committed_at(&self) -> DateTime<Utc> {
        self.entry.created_at
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Find an account by ID
    async fn find_by_id(&self, id: AccountId) -> Result<Account, LifecycleError>;

    /// One page of accounts, newest first, plus the total match count
    async fn list(
        &self,
        filter: &AccountFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Account>, i64), LifecycleError>;

    /// Status log of an account, most recent first
    async fn status_logs(&self, id: AccountId) -> Result<Vec<StatusLogEntry>, LifecycleError>;

    /// Insert a new account
    async fn create(&self, account: &Account) -> Result<Account, LifecycleError>;

    /// Replace profile fields if the account is still at `expected_version`
    async fn update_profile(
        &self,
        id: AccountId,
        expected_version: i64,
        profile: &AccountProfile,
        at: DateTime<Utc>,
    ) -> Result<Account, LifecycleError>;

    /// Atomically apply a transition and append its log entry
    async fn commit_transition(&self, commit: &TransitionCommit)
        -> Result<Account, LifecycleError>;
}
