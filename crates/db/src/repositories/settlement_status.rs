//! Settlement status repository for database operations.
//!
//! Tracks which computed transfers have been marked as paid, keyed by
//! `(group_id, from_member_id, to_member_id)`.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{groups, settlement_status};

/// Errors returned by settlement status operations.
#[derive(Debug, Error)]
pub enum SettlementStatusError {
    /// The owning group does not exist.
    #[error("group not found")]
    GroupNotFound,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Settlement status repository.
#[derive(Debug, Clone)]
pub struct SettlementStatusRepository {
    db: DatabaseConnection,
}

impl SettlementStatusRepository {
    /// Creates a new settlement status repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Flips the settled flag for a transfer pair, creating the row as
    /// settled on first toggle. Returns the new flag value.
    ///
    /// # Errors
    ///
    /// Returns `SettlementStatusError::GroupNotFound` for an unknown
    /// group, or a database error.
    pub async fn toggle(
        &self,
        group_id: Uuid,
        from_member_id: i64,
        to_member_id: i64,
    ) -> Result<bool, SettlementStatusError> {
        if groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(SettlementStatusError::GroupNotFound);
        }

        let existing = settlement_status::Entity::find_by_id((group_id, from_member_id, to_member_id))
            .one(&self.db)
            .await?;

        match existing {
            Some(row) => {
                let new_status = !row.is_settled;
                let mut row: settlement_status::ActiveModel = row.into();
                row.is_settled = Set(new_status);
                row.update(&self.db).await?;
                Ok(new_status)
            }
            None => {
                let row = settlement_status::ActiveModel {
                    group_id: Set(group_id),
                    from_member_id: Set(from_member_id),
                    to_member_id: Set(to_member_id),
                    is_settled: Set(true),
                    updated_at: Set(chrono::Utc::now().into()),
                };
                row.insert(&self.db).await?;
                Ok(true)
            }
        }
    }

    /// Lists all settlement status rows for a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<settlement_status::Model>, SettlementStatusError> {
        Ok(settlement_status::Entity::find()
            .filter(settlement_status::Column::GroupId.eq(group_id))
            .all(&self.db)
            .await?)
    }
}
