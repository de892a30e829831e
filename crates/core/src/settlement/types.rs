//! Settlement data types.
//!
//! All amounts are `i64` in the smallest currency unit. The calculator
//! consumes immutable snapshots of these records and owns none of them.

use serde::{Deserialize, Serialize};
use splitpot_shared::types::{ExpenseId, MemberId};

/// A group member as seen by the calculator.
///
/// Bank routing fields are display-only and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member ID, unique within a group.
    pub id: MemberId,
    /// Display name.
    pub name: String,
}

/// A recorded shared expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// The member who paid the expense.
    pub payer_member_id: MemberId,
    /// Total paid amount in minor units.
    pub amount: i64,
}

/// One member's share of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    /// The expense this split belongs to.
    pub expense_id: ExpenseId,
    /// The member who owes this share.
    pub member_id: MemberId,
    /// Owed amount in minor units. Splits of one expense sum to its amount
    /// (enforced by the caller, not the calculator).
    pub owed_amount: i64,
}

/// A directed settling transfer: `from` pays `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The paying member (net debtor).
    pub from: MemberId,
    /// The receiving member (net creditor).
    pub to: MemberId,
    /// Transferred amount in minor units, always strictly positive.
    pub amount: i64,
}
