//! Transaction management utilities for repositories.

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::LifecycleError;

/// Begin a new database transaction.
///
/// On success, commit via [`commit_transaction`]; on failure, roll back via
/// [`rollback_transaction`] (dropping the handle also rolls back).
pub async fn begin_transaction(db: &PgPool) -> Result<Transaction<'static, Postgres>, LifecycleError> {
    db.begin().await.map_err(LifecycleError::from)
}

/// Commit all changes made within the transaction.
pub async fn commit_transaction(tx: Transaction<'_, Postgres>) -> Result<(), LifecycleError> {
    tx.commit().await.map_err(LifecycleError::from)
}

/// Undo all changes made within the transaction since it began.
pub async fn rollback_transaction(tx: Transaction<'_, Postgres>) -> Result<(), LifecycleError> {
    tx.rollback().await.map_err(LifecycleError::from)
}
