//! Member repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{expense_splits, expenses, groups, members};

/// Errors returned by member operations.
#[derive(Debug, Error)]
pub enum MemberError {
    /// Name is empty or exceeds the column limit.
    #[error("member name must be between 1 and 255 characters")]
    InvalidName,

    /// The owning group does not exist.
    #[error("group not found")]
    GroupNotFound,

    /// Member does not exist in the group.
    #[error("member not found")]
    NotFound,

    /// Member is still referenced by an expense or a split.
    #[error("member is referenced by existing expenses")]
    HasExpenses,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Fields accepted when updating a member.
#[derive(Debug, Clone, Default)]
pub struct UpdateMemberInput {
    /// New display name.
    pub name: String,
    /// Bank code for display, cleared when `None`.
    pub bank_code: Option<String>,
    /// Bank account for display, cleared when `None`.
    pub bank_account: Option<String>,
}

/// Member repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds a member to a group.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::GroupNotFound` for an unknown group,
    /// `MemberError::InvalidName` for a bad name, or a database error.
    pub async fn add(
        &self,
        group_id: Uuid,
        name: &str,
        bank_code: Option<String>,
        bank_account: Option<String>,
    ) -> Result<members::Model, MemberError> {
        let name = validate_name(name)?;

        if groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(MemberError::GroupNotFound);
        }

        let member = members::ActiveModel {
            group_id: Set(group_id),
            name: Set(name),
            bank_code: Set(bank_code),
            bank_account: Set(bank_account),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(member.insert(&self.db).await?)
    }

    /// Updates a member's name and bank fields.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound` when the member is not in the
    /// group, `MemberError::InvalidName` for a bad name, or a database
    /// error.
    pub async fn update(
        &self,
        group_id: Uuid,
        member_id: i64,
        input: UpdateMemberInput,
    ) -> Result<members::Model, MemberError> {
        let name = validate_name(&input.name)?;

        let Some(member) = members::Entity::find_by_id(member_id)
            .filter(members::Column::GroupId.eq(group_id))
            .one(&self.db)
            .await?
        else {
            return Err(MemberError::NotFound);
        };

        let mut member: members::ActiveModel = member.into();
        member.name = Set(name);
        member.bank_code = Set(input.bank_code);
        member.bank_account = Set(input.bank_account);

        Ok(member.update(&self.db).await?)
    }

    /// Removes a member from a group.
    ///
    /// Refuses while the member is still referenced by any expense (as
    /// payer) or by any split, so recorded history stays resolvable.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::HasExpenses` when referenced,
    /// `MemberError::NotFound` when absent, or a database error.
    pub async fn remove(&self, group_id: Uuid, member_id: i64) -> Result<(), MemberError> {
        let paid_expenses = expenses::Entity::find()
            .filter(expenses::Column::PayerMemberId.eq(member_id))
            .count(&self.db)
            .await?;

        let owed_splits = expense_splits::Entity::find()
            .filter(expense_splits::Column::MemberId.eq(member_id))
            .count(&self.db)
            .await?;

        if paid_expenses > 0 || owed_splits > 0 {
            return Err(MemberError::HasExpenses);
        }

        let result = members::Entity::delete_many()
            .filter(members::Column::Id.eq(member_id))
            .filter(members::Column::GroupId.eq(group_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(MemberError::NotFound);
        }

        Ok(())
    }

    /// Lists the members of a group, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<members::Model>, MemberError> {
        Ok(members::Entity::find()
            .filter(members::Column::GroupId.eq(group_id))
            .order_by_asc(members::Column::Id)
            .all(&self.db)
            .await?)
    }
}

fn validate_name(name: &str) -> Result<String, MemberError> {
    let name = name.trim();
    if name.is_empty() || name.len() > 255 {
        return Err(MemberError::InvalidName);
    }
    Ok(name.to_string())
}
