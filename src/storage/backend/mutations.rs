//! Mutation operations for SeaOrmStore
//!
//! Counter and destination changes run as `UPDATE ... WHERE short_code = ?`
//! followed by a read of the same row in one transaction. The row (or, on
//! SQLite, the database write lock) stays locked until commit, so the record
//! returned is exactly the state the mutation produced.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, ExprTrait, Insert, QueryFilter, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info};

use super::SeaOrmStore;
use super::converters::{model_to_record, record_to_active_model};
use crate::errors::{Result, SnaplinkError};
use crate::storage::LinkRecord;
use crate::storage::models::timestamp_now;

use migration::entities::short_link;

fn not_found(code: &str) -> SnaplinkError {
    SnaplinkError::not_found(format!("Link '{}' not found", code))
}

/// Plain `INSERT`. Conflict clauses differ per backend (MySQL has no `DO NOTHING`,
/// and its affected-row count reports matched rows), so a taken code is detected
/// from the driver's unique-violation error instead.
fn insert_statement(record: &LinkRecord) -> Insert<short_link::ActiveModel> {
    short_link::Entity::insert(record_to_active_model(record))
}

fn insert_error(code: &str, err: DbErr) -> SnaplinkError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            debug!("SeaOrmStore: insert collided on '{}'", code);
            SnaplinkError::already_exists(format!("Code '{}' already exists", code))
        }
        _ => SnaplinkError::database_operation(format!("Failed to insert '{}': {}", code, err)),
    }
}

impl SeaOrmStore {
    pub(super) async fn insert_new(&self, code: &str, destination: &str) -> Result<LinkRecord> {
        let record = LinkRecord::new(code, destination);

        insert_statement(&record)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| insert_error(code, e))?;

        info!("Short link inserted: {}", code);
        Ok(record)
    }

    pub(super) async fn increment_and_fetch(&self, code: &str) -> Result<LinkRecord> {
        let txn = self.begin().await?;

        short_link::Entity::update_many()
            .col_expr(
                short_link::Column::AccessCount,
                Expr::col(short_link::Column::AccessCount).add(1),
            )
            .filter(short_link::Column::ShortCode.eq(code))
            .exec(&txn)
            .await
            .map_err(|e| {
                SnaplinkError::database_operation(format!(
                    "Failed to count click for '{}': {}",
                    code, e
                ))
            })?;

        let record = Self::fetch_in(&txn, code).await?;
        Self::commit(txn).await?;
        Ok(record)
    }

    pub(super) async fn replace_destination(
        &self,
        code: &str,
        destination: &str,
    ) -> Result<LinkRecord> {
        let txn = self.begin().await?;

        short_link::Entity::update_many()
            .col_expr(short_link::Column::TargetUrl, Expr::value(destination))
            .col_expr(short_link::Column::UpdatedAt, Expr::value(timestamp_now()))
            .filter(short_link::Column::ShortCode.eq(code))
            .exec(&txn)
            .await
            .map_err(|e| {
                SnaplinkError::database_operation(format!("Failed to update '{}': {}", code, e))
            })?;

        let record = Self::fetch_in(&txn, code).await?;
        Self::commit(txn).await?;

        info!("Short link updated: {}", code);
        Ok(record)
    }

    pub(super) async fn remove(&self, code: &str) -> Result<()> {
        let result = short_link::Entity::delete_by_id(code.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| {
                SnaplinkError::database_operation(format!("Failed to delete '{}': {}", code, e))
            })?;

        if result.rows_affected == 0 {
            return Err(not_found(code));
        }

        info!("Short link deleted: {}", code);
        Ok(())
    }

    async fn begin(&self) -> Result<DatabaseTransaction> {
        self.db.begin().await.map_err(|e| {
            SnaplinkError::database_operation(format!("Failed to begin transaction: {}", e))
        })
    }

    async fn commit(txn: DatabaseTransaction) -> Result<()> {
        txn.commit().await.map_err(|e| {
            SnaplinkError::database_operation(format!("Failed to commit transaction: {}", e))
        })
    }

    /// Reads the row inside `txn`. Dropping an uncommitted transaction rolls it back,
    /// so the `NotFound` path needs no explicit rollback.
    async fn fetch_in(txn: &DatabaseTransaction, code: &str) -> Result<LinkRecord> {
        short_link::Entity::find_by_id(code.to_string())
            .one(txn)
            .await
            .map_err(|e| {
                SnaplinkError::database_operation(format!("Failed to read '{}': {}", code, e))
            })?
            .map(model_to_record)
            .ok_or_else(|| not_found(code))
    }
}
