//! Expense repository for database operations.
//!
//! Carries the validation the settlement calculator deliberately skips:
//! amounts must be non-negative, splits must sum exactly to their
//! expense's amount, and every referenced member must belong to the group.

use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{expense_splits, expenses, groups, members};

/// Errors returned by expense operations.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// The owning group does not exist.
    #[error("group not found")]
    GroupNotFound,

    /// Expense does not exist in the group.
    #[error("expense not found")]
    NotFound,

    /// Expense amount or a split's owed amount is negative.
    #[error("amounts must be non-negative")]
    NegativeAmount,

    /// An expense needs at least one split.
    #[error("expense must have at least one split")]
    EmptySplits,

    /// A member appears in more than one split of the same expense.
    #[error("member {0} appears in multiple splits")]
    DuplicateSplitMember(i64),

    /// Split owed amounts do not sum to the expense amount.
    #[error("splits sum to {actual}, expected {expected}")]
    SplitSumMismatch {
        /// The expense amount.
        expected: i64,
        /// What the splits actually sum to.
        actual: i64,
    },

    /// The payer or a split references a member outside the group.
    #[error("member {0} is not part of the group")]
    UnknownMember(i64),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// One member's share in an expense being created or updated.
#[derive(Debug, Clone, Copy)]
pub struct SplitInput {
    /// The owing member.
    pub member_id: i64,
    /// Owed amount in minor units.
    pub owed_amount: i64,
}

/// Fields accepted when creating or replacing an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// The member who paid.
    pub payer_member_id: i64,
    /// Total amount in minor units.
    pub amount: i64,
    /// Free-form description.
    pub description: Option<String>,
    /// Display name of whoever recorded the expense.
    pub created_by_name: Option<String>,
    /// Per-member shares; must sum to `amount`.
    pub splits: Vec<SplitInput>,
}

/// Expense repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an expense and its splits in one transaction.
    ///
    /// # Errors
    ///
    /// Returns a validation variant of `ExpenseError` for malformed
    /// input, `ExpenseError::GroupNotFound` for an unknown group, or a
    /// database error.
    pub async fn create(
        &self,
        group_id: Uuid,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let txn = self.db.begin().await?;

        if groups::Entity::find_by_id(group_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ExpenseError::GroupNotFound);
        }

        let member_ids = group_member_ids(&txn, group_id).await?;
        validate_input(&input, &member_ids)?;

        let expense = expenses::ActiveModel {
            group_id: Set(group_id),
            payer_member_id: Set(input.payer_member_id),
            amount: Set(input.amount),
            description: Set(input.description.clone()),
            created_by_name: Set(input.created_by_name.clone()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        let expense = expense.insert(&txn).await?;

        insert_splits(&txn, expense.id, &input.splits).await?;

        txn.commit().await?;

        Ok(expense)
    }

    /// Replaces an expense and its splits (delete + reinsert) in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::NotFound` when the expense is not in the
    /// group, a validation variant for malformed input, or a database
    /// error.
    pub async fn update(
        &self,
        group_id: Uuid,
        expense_id: i64,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let txn = self.db.begin().await?;

        let Some(existing) = expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::GroupId.eq(group_id))
            .one(&txn)
            .await?
        else {
            return Err(ExpenseError::NotFound);
        };

        let member_ids = group_member_ids(&txn, group_id).await?;
        validate_input(&input, &member_ids)?;

        let mut expense: expenses::ActiveModel = existing.into();
        expense.payer_member_id = Set(input.payer_member_id);
        expense.amount = Set(input.amount);
        expense.description = Set(input.description.clone());
        expense.created_by_name = Set(input.created_by_name.clone());
        let expense = expense.update(&txn).await?;

        expense_splits::Entity::delete_many()
            .filter(expense_splits::Column::ExpenseId.eq(expense_id))
            .exec(&txn)
            .await?;

        insert_splits(&txn, expense_id, &input.splits).await?;

        txn.commit().await?;

        Ok(expense)
    }

    /// Deletes an expense; its splits cascade.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::NotFound` when the expense is not in the
    /// group, or a database error.
    pub async fn delete(&self, group_id: Uuid, expense_id: i64) -> Result<(), ExpenseError> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(expense_id))
            .filter(expenses::Column::GroupId.eq(group_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ExpenseError::NotFound);
        }

        Ok(())
    }
}

async fn group_member_ids(
    txn: &DatabaseTransaction,
    group_id: Uuid,
) -> Result<HashSet<i64>, DbErr> {
    let rows = members::Entity::find()
        .filter(members::Column::GroupId.eq(group_id))
        .all(txn)
        .await?;

    Ok(rows.into_iter().map(|m| m.id).collect())
}

fn validate_input(input: &CreateExpenseInput, member_ids: &HashSet<i64>) -> Result<(), ExpenseError> {
    if input.amount < 0 || input.splits.iter().any(|s| s.owed_amount < 0) {
        return Err(ExpenseError::NegativeAmount);
    }

    if input.splits.is_empty() {
        return Err(ExpenseError::EmptySplits);
    }

    if !member_ids.contains(&input.payer_member_id) {
        return Err(ExpenseError::UnknownMember(input.payer_member_id));
    }

    let mut seen = HashSet::new();
    for split in &input.splits {
        if !member_ids.contains(&split.member_id) {
            return Err(ExpenseError::UnknownMember(split.member_id));
        }
        if !seen.insert(split.member_id) {
            return Err(ExpenseError::DuplicateSplitMember(split.member_id));
        }
    }

    let actual: i64 = input.splits.iter().map(|s| s.owed_amount).sum();
    if actual != input.amount {
        return Err(ExpenseError::SplitSumMismatch {
            expected: input.amount,
            actual,
        });
    }

    Ok(())
}

async fn insert_splits(
    txn: &DatabaseTransaction,
    expense_id: i64,
    splits: &[SplitInput],
) -> Result<(), DbErr> {
    let rows: Vec<expense_splits::ActiveModel> = splits
        .iter()
        .map(|s| expense_splits::ActiveModel {
            expense_id: Set(expense_id),
            member_id: Set(s.member_id),
            owed_amount: Set(s.owed_amount),
        })
        .collect();

    expense_splits::Entity::insert_many(rows).exec(txn).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(payer: i64, amount: i64, splits: &[(i64, i64)]) -> CreateExpenseInput {
        CreateExpenseInput {
            payer_member_id: payer,
            amount,
            description: None,
            created_by_name: None,
            splits: splits
                .iter()
                .map(|(member_id, owed_amount)| SplitInput {
                    member_id: *member_id,
                    owed_amount: *owed_amount,
                })
                .collect(),
        }
    }

    fn group_of(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn accepts_well_formed_input() {
        let result = validate_input(&input(1, 100, &[(1, 34), (2, 33), (3, 33)]), &group_of(&[1, 2, 3]));
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_negative_amount() {
        let result = validate_input(&input(1, -100, &[(1, -100)]), &group_of(&[1]));
        assert!(matches!(result, Err(ExpenseError::NegativeAmount)));
    }

    #[test]
    fn rejects_negative_owed_amount() {
        let result = validate_input(&input(1, 0, &[(1, 100), (2, -100)]), &group_of(&[1, 2]));
        assert!(matches!(result, Err(ExpenseError::NegativeAmount)));
    }

    #[test]
    fn rejects_empty_splits() {
        let result = validate_input(&input(1, 100, &[]), &group_of(&[1]));
        assert!(matches!(result, Err(ExpenseError::EmptySplits)));
    }

    #[test]
    fn rejects_split_sum_mismatch() {
        let result = validate_input(&input(1, 100, &[(1, 33), (2, 33), (3, 33)]), &group_of(&[1, 2, 3]));
        assert!(matches!(
            result,
            Err(ExpenseError::SplitSumMismatch {
                expected: 100,
                actual: 99
            })
        ));
    }

    #[test]
    fn rejects_unknown_payer() {
        let result = validate_input(&input(9, 100, &[(1, 100)]), &group_of(&[1]));
        assert!(matches!(result, Err(ExpenseError::UnknownMember(9))));
    }

    #[test]
    fn rejects_unknown_split_member() {
        let result = validate_input(&input(1, 100, &[(7, 100)]), &group_of(&[1]));
        assert!(matches!(result, Err(ExpenseError::UnknownMember(7))));
    }

    #[test]
    fn rejects_duplicate_split_member() {
        let result = validate_input(&input(1, 100, &[(1, 50), (1, 50)]), &group_of(&[1]));
        assert!(matches!(result, Err(ExpenseError::DuplicateSplitMember(1))));
    }
}
