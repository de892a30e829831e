//! Debt simplification and transfer planning.
//!
//! This module implements the settlement core:
//! - Snapshot types consumed by the calculator
//! - Net balance computation per member
//! - Greedy minimal-transfer matching

pub mod calculator;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::{SETTLEMENT_TOLERANCE, calculate_settlement, net_balances};
pub use types::{Expense, ExpenseSplit, Member, Transfer};
