//! Group repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use splitpot_core::settlement::{self, Transfer};
use splitpot_shared::types::{ExpenseId, MemberId};

use crate::entities::{expense_splits, expenses, groups, members};

/// Errors returned by group operations.
#[derive(Debug, Error)]
pub enum GroupError {
    /// Name is empty or exceeds the column limit.
    #[error("group name must be between 1 and 255 characters")]
    InvalidName,

    /// Group does not exist.
    #[error("group not found")]
    NotFound,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// A group with its members and expenses (each expense with its splits).
#[derive(Debug, Clone)]
pub struct GroupDetail {
    /// The group record.
    pub group: groups::Model,
    /// Members of the group, oldest first.
    pub members: Vec<members::Model>,
    /// Expenses of the group, newest first.
    pub expenses: Vec<ExpenseWithSplits>,
}

/// An expense together with its per-member splits.
#[derive(Debug, Clone)]
pub struct ExpenseWithSplits {
    /// The expense record.
    pub expense: expenses::Model,
    /// Splits belonging to the expense.
    pub splits: Vec<expense_splits::Model>,
}

/// A self-consistent point-in-time view of one group's ledger, read in a
/// single transaction so the calculator never sees a half-applied update.
#[derive(Debug, Clone)]
pub struct SettlementSnapshot {
    /// Members of the group.
    pub members: Vec<members::Model>,
    /// Expenses of the group.
    pub expenses: Vec<expenses::Model>,
    /// Splits of the group's expenses.
    pub splits: Vec<expense_splits::Model>,
}

impl SettlementSnapshot {
    /// Runs the settlement calculator over this snapshot.
    #[must_use]
    pub fn settlement_plan(&self) -> Vec<Transfer> {
        let members: Vec<settlement::Member> = self
            .members
            .iter()
            .map(|m| settlement::Member {
                id: MemberId::from_raw(m.id),
                name: m.name.clone(),
            })
            .collect();

        let expenses: Vec<settlement::Expense> = self
            .expenses
            .iter()
            .map(|e| settlement::Expense {
                id: ExpenseId::from_raw(e.id),
                payer_member_id: MemberId::from_raw(e.payer_member_id),
                amount: e.amount,
            })
            .collect();

        let splits: Vec<settlement::ExpenseSplit> = self
            .splits
            .iter()
            .map(|s| settlement::ExpenseSplit {
                expense_id: ExpenseId::from_raw(s.expense_id),
                member_id: MemberId::from_raw(s.member_id),
                owed_amount: s.owed_amount,
            })
            .collect();

        settlement::calculate_settlement(&members, &expenses, &splits)
    }

    /// Sum of all expense amounts in the snapshot.
    #[must_use]
    pub fn total_expense(&self) -> i64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

/// Group repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new group.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::InvalidName` for an empty or oversized name,
    /// or a database error if the insert fails.
    pub async fn create(&self, name: &str) -> Result<groups::Model, GroupError> {
        let name = name.trim();
        if name.is_empty() || name.len() > 255 {
            return Err(GroupError::InvalidName);
        }

        let now = chrono::Utc::now().into();
        let group = groups::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(group.insert(&self.db).await?)
    }

    /// Lists all groups, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<groups::Model>, GroupError> {
        Ok(groups::Entity::find()
            .order_by_desc(groups::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Finds a group by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<groups::Model>, GroupError> {
        Ok(groups::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Loads a group together with its members and expenses (with splits).
    ///
    /// # Errors
    ///
    /// Returns an error if any database query fails.
    pub async fn find_detail(&self, id: Uuid) -> Result<Option<GroupDetail>, GroupError> {
        let Some(group) = groups::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let members = members::Entity::find()
            .filter(members::Column::GroupId.eq(id))
            .order_by_asc(members::Column::Id)
            .all(&self.db)
            .await?;

        let expense_rows = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(id))
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let expense_ids: Vec<i64> = expense_rows.iter().map(|e| e.id).collect();
        let split_rows = expense_splits::Entity::find()
            .filter(expense_splits::Column::ExpenseId.is_in(expense_ids))
            .all(&self.db)
            .await?;

        let expenses = expense_rows
            .into_iter()
            .map(|expense| {
                let splits = split_rows
                    .iter()
                    .filter(|s| s.expense_id == expense.id)
                    .cloned()
                    .collect();
                ExpenseWithSplits { expense, splits }
            })
            .collect();

        Ok(Some(GroupDetail {
            group,
            members,
            expenses,
        }))
    }

    /// Reads a consistent snapshot of the group's members, expenses, and
    /// splits for the settlement calculator.
    ///
    /// All reads happen inside one transaction; the calculator must never
    /// see an expense whose splits are still being written.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::NotFound` for an unknown group, or a database
    /// error if any query fails.
    pub async fn settlement_snapshot(&self, id: Uuid) -> Result<SettlementSnapshot, GroupError> {
        let txn = self.db.begin().await?;

        if groups::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(GroupError::NotFound);
        }

        let members = members::Entity::find()
            .filter(members::Column::GroupId.eq(id))
            .order_by_asc(members::Column::Id)
            .all(&txn)
            .await?;

        let expenses = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(id))
            .all(&txn)
            .await?;

        let expense_ids: Vec<i64> = expenses.iter().map(|e| e.id).collect();
        let splits = expense_splits::Entity::find()
            .filter(expense_splits::Column::ExpenseId.is_in(expense_ids))
            .all(&txn)
            .await?;

        txn.commit().await?;

        tracing::debug!(
            group_id = %id,
            members = members.len(),
            expenses = expenses.len(),
            splits = splits.len(),
            "Settlement snapshot read"
        );

        Ok(SettlementSnapshot {
            members,
            expenses,
            splits,
        })
    }
}
