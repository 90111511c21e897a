//! Postgres-backed account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::LifecycleError;
use crate::models::{
    account::{Account, AccountFilter, AccountProfile},
    status_log::StatusLogEntry,
};
use crate::repositories::account_repository::{AccountRepositoryTrait, TransitionCommit};
use crate::repositories::common::{like_pattern, push_clause};
use crate::repositories::transaction::{
    begin_transaction, commit_transaction, rollback_transaction,
};
use crate::types::AccountId;

const TABLE_NAME: &str = "accounts";
const LOG_TABLE_NAME: &str = "account_status_logs";
const SELECT_COLUMNS: &str = "id, kind, lifecycle_state, is_active, display_name, email, phone, \
     blood_type, location_id, avatar_url, version, created_at, updated_at";
const LOG_COLUMNS: &str =
    "id, account_id, resulting_state, display_label, description, actor_id, created_at";

#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tells a missing row apart from a stale version after a guarded write
    /// matched nothing.
    async fn missing_or_conflict<'e, E>(executor: E, id: AccountId) -> LifecycleError
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", TABLE_NAME);
        match sqlx::query_scalar::<_, bool>(&query)
            .bind(id)
            .fetch_one(executor)
            .await
        {
            Ok(true) => LifecycleError::Conflict(id),
            Ok(false) => LifecycleError::NotFound(id),
            Err(err) => err.into(),
        }
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AccountFilter) {
    let mut has_clause = false;
    if let Some(state) = filter.state {
        push_clause(builder, &mut has_clause);
        builder.push("lifecycle_state = ").push_bind(state.as_str());
    }
    if let Some(is_active) = filter.is_active {
        push_clause(builder, &mut has_clause);
        builder.push("is_active = ").push_bind(is_active);
    }
    if let Some(kind) = filter.kind {
        push_clause(builder, &mut has_clause);
        builder.push("kind = ").push_bind(kind.as_str());
    }
    if let Some(location_id) = filter.location_id.clone() {
        push_clause(builder, &mut has_clause);
        builder.push("location_id = ").push_bind(location_id);
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        push_clause(builder, &mut has_clause);
        builder
            .push("(display_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR COALESCE(email, '') ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR COALESCE(phone, '') ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl AccountRepositoryTrait for PgAccountRepository {
    async fn find_by_id(&self, id: AccountId) -> Result<Account, LifecycleError> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, TABLE_NAME);
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    async fn list(
        &self,
        filter: &AccountFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Account>, i64), LifecycleError> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", TABLE_NAME));
        apply_filters(&mut count_builder, filter);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {}",
            SELECT_COLUMNS, TABLE_NAME
        ));
        apply_filters(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let items = builder
            .build_query_as::<Account>()
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn status_logs(&self, id: AccountId) -> Result<Vec<StatusLogEntry>, LifecycleError> {
        let query = format!(
            "SELECT {} FROM {} WHERE account_id = $1 ORDER BY created_at DESC, id DESC",
            LOG_COLUMNS, LOG_TABLE_NAME
        );
        let rows = sqlx::query_as::<_, StatusLogEntry>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, account: &Account) -> Result<Account, LifecycleError> {
        let query = format!(
            "INSERT INTO {} ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(account.id)
            .bind(account.kind.as_str())
            .bind(account.lifecycle_state.as_str())
            .bind(account.is_active)
            .bind(&account.display_name)
            .bind(&account.email)
            .bind(&account.phone)
            .bind(account.blood_type.map(|b| b.as_str()))
            .bind(&account.location_id)
            .bind(&account.avatar_url)
            .bind(account.version)
            .bind(account.created_at)
            .bind(account.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_profile(
        &self,
        id: AccountId,
        expected_version: i64,
        profile: &AccountProfile,
        at: DateTime<Utc>,
    ) -> Result<Account, LifecycleError> {
        let current = profile.clone().normalized();

        let query = format!(
            "UPDATE {} SET display_name = $3, email = $4, phone = $5, blood_type = $6, \
             location_id = $7, avatar_url = $8, version = version + 1, updated_at = $9 \
             WHERE id = $1 AND version = $2 \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(&current.display_name)
            .bind(&current.email)
            .bind(&current.phone)
            .bind(current.blood_type.map(|b| b.as_str()))
            .bind(&current.location_id)
            .bind(&current.avatar_url)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(account) => Ok(account),
            None => Err(Self::missing_or_conflict(&self.pool, id).await),
        }
    }

    async fn commit_transition(
        &self,
        commit: &TransitionCommit,
    ) -> Result<Account, LifecycleError> {
        let mut tx = begin_transaction(&self.pool).await?;

        let update = format!(
            "UPDATE {} SET lifecycle_state = $3, is_active = $4, version = version + 1, \
             updated_at = $5 WHERE id = $1 AND version = $2 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Account>(&update)
            .bind(commit.account_id)
            .bind(commit.expected_version)
            .bind(commit.next_state.as_str())
            .bind(commit.next_active)
            .bind(commit.committed_at())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(account) = updated else {
            let err = Self::missing_or_conflict(&mut *tx, commit.account_id).await;
            rollback_transaction(tx).await?;
            return Err(err);
        };

        let insert = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            LOG_TABLE_NAME, LOG_COLUMNS
        );
        let entry = &commit.entry;
        sqlx::query(&insert)
            .bind(entry.id)
            .bind(entry.account_id)
            .bind(entry.resulting_state.map(|s| s.as_str()))
            .bind(&entry.display_label)
            .bind(&entry.description)
            .bind(entry.actor_id)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;

        commit_transaction(tx).await?;
        Ok(account)
    }
}
