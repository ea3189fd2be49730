//! Query operations for SeaOrmStore
//!
//! This module contains all read-only database operations.

use sea_orm::{EntityTrait, PaginatorTrait};

use super::SeaOrmStore;
use super::converters::model_to_record;
use crate::errors::{Result, SnaplinkError};
use crate::storage::LinkRecord;

use migration::entities::short_link;

impl SeaOrmStore {
    pub(super) async fn find(&self, code: &str) -> Result<LinkRecord> {
        short_link::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(|e| {
                SnaplinkError::database_operation(format!("Failed to read '{}': {}", code, e))
            })?
            .map(model_to_record)
            .ok_or_else(|| SnaplinkError::not_found(format!("Link '{}' not found", code)))
    }

    pub(super) async fn count_links(&self) -> Result<u64> {
        short_link::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| SnaplinkError::database_operation(format!("Failed to count links: {}", e)))
    }
}
