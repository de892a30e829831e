//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Input validation that the settlement calculator does not
//! perform (non-negative amounts, splits summing to their expense, member
//! ids belonging to the group) lives here, before anything is written.

pub mod expense;
pub mod group;
pub mod member;
pub mod settlement_status;

pub use expense::{CreateExpenseInput, ExpenseError, ExpenseRepository, SplitInput};
pub use group::{ExpenseWithSplits, GroupDetail, GroupError, GroupRepository, SettlementSnapshot};
pub use member::{MemberError, MemberRepository, UpdateMemberInput};
pub use settlement_status::{SettlementStatusError, SettlementStatusRepository};
