//! `SeaORM` entity definitions.

pub mod expense_splits;
pub mod expenses;
pub mod groups;
pub mod members;
pub mod settlement_status;
