//! In-process account store used when no database is configured and by the
//! router tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::LifecycleError;
use crate::models::{
    account::{Account, AccountFilter, AccountProfile},
    status_log::{sort_newest_first, StatusLogEntry},
};
use crate::repositories::account_repository::{AccountRepositoryTrait, TransitionCommit};
use crate::types::AccountId;

#[derive(Debug, Default)]
struct Store {
    accounts: HashMap<AccountId, Account>,
    logs: HashMap<AccountId, Vec<StatusLogEntry>>,
}

#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    store: RwLock<Store>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account with pre-existing history, bypassing the lifecycle.
    pub async fn insert_with_history(&self, account: Account, history: Vec<StatusLogEntry>) {
        let mut store = self.store.write().await;
        store.logs.insert(account.id, history);
        store.accounts.insert(account.id, account);
    }
}

#[async_trait]
impl AccountRepositoryTrait for InMemoryAccountRepository {
    async fn find_by_id(&self, id: AccountId) -> Result<Account, LifecycleError> {
        let store = self.store.read().await;
        store
            .accounts
            .get(&id)
            .cloned()
            .ok_or(LifecycleError::NotFound(id))
    }

    async fn list(
        &self,
        filter: &AccountFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Account>, i64), LifecycleError> {
        let store = self.store.read().await;
        let mut matches: Vec<Account> = store
            .accounts
            .values()
            .filter(|account| filter.accepts(account))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok((items, total))
    }

    async fn status_logs(&self, id: AccountId) -> Result<Vec<StatusLogEntry>, LifecycleError> {
        let store = self.store.read().await;
        let mut entries = store.logs.get(&id).cloned().unwrap_or_default();
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    async fn create(&self, account: &Account) -> Result<Account, LifecycleError> {
        let mut store = self.store.write().await;
        if store.accounts.contains_key(&account.id) {
            return Err(LifecycleError::Conflict(account.id));
        }
        store.accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn update_profile(
        &self,
        id: AccountId,
        expected_version: i64,
        profile: &AccountProfile,
        at: DateTime<Utc>,
    ) -> Result<Account, LifecycleError> {
        let mut store = self.store.write().await;
        let account = store
            .accounts
            .get_mut(&id)
            .ok_or(LifecycleError::NotFound(id))?;
        if account.version != expected_version {
            return Err(LifecycleError::Conflict(id));
        }
        account.apply_profile(profile.clone(), at);
        Ok(account.clone())
    }

    async fn commit_transition(
        &self,
        commit: &TransitionCommit,
    ) -> Result<Account, LifecycleError> {
        // Held across check and write so the pair is atomic.
        let mut store = self.store.write().await;
        let account = store
            .accounts
            .get_mut(&commit.account_id)
            .ok_or(LifecycleError::NotFound(commit.account_id))?;
        if account.version != commit.expected_version {
            return Err(LifecycleError::Conflict(commit.account_id));
        }

        account.lifecycle_state = commit.next_state;
        account.is_active = commit.next_active;
        account.version += 1;
        account.updated_at = commit.committed_at();
        let updated = account.clone();

        store
            .logs
            .entry(commit.account_id)
            .or_default()
            .push(commit.entry.clone());
        Ok(updated)
    }
}
