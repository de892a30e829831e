//! Property-based tests for the settlement calculator.
//!
//! - Zero-sum: applying the emitted transfers settles every balance
//! - Transfer amounts are always strictly positive
//! - Balanced input produces an empty plan
//! - Output is independent of input ordering

use proptest::prelude::*;
use splitpot_shared::types::{ExpenseId, MemberId};

use super::calculator::{SETTLEMENT_TOLERANCE, calculate_settlement, net_balances};
use super::types::{Expense, ExpenseSplit, Member};

/// A well-formed ledger: members plus expenses whose splits sum exactly to
/// the expense amount and reference only known members.
fn ledger_strategy() -> impl Strategy<Value = (Vec<Member>, Vec<Expense>, Vec<ExpenseSplit>)> {
    (2usize..=8).prop_flat_map(|member_count| {
        let members: Vec<Member> = (1..=member_count as i64)
            .map(|id| Member {
                id: MemberId::from_raw(id),
                name: format!("member-{id}"),
            })
            .collect();

        let share_row = prop::collection::vec(0i64..50_000, member_count);
        let expense_rows = prop::collection::vec((0..member_count, share_row), 0..6);

        expense_rows.prop_map(move |rows| {
            let mut expenses = Vec::new();
            let mut splits = Vec::new();

            for (expense_idx, (payer_idx, shares)) in rows.into_iter().enumerate() {
                let expense_id = ExpenseId::from_raw(expense_idx as i64 + 1);
                let amount: i64 = shares.iter().sum();

                expenses.push(Expense {
                    id: expense_id,
                    payer_member_id: members[payer_idx].id,
                    amount,
                });

                for (member_idx, owed) in shares.into_iter().enumerate() {
                    if owed > 0 {
                        splits.push(ExpenseSplit {
                            expense_id,
                            member_id: members[member_idx].id,
                            owed_amount: owed,
                        });
                    }
                }
            }

            (members.clone(), expenses, splits)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After executing every emitted transfer, each member's adjusted
    /// balance lies within the settlement tolerance of zero.
    #[test]
    fn prop_transfers_settle_all_balances(
        (members, expenses, splits) in ledger_strategy(),
    ) {
        let mut balances = net_balances(&members, &expenses, &splits);
        let plan = calculate_settlement(&members, &expenses, &splits);

        for t in &plan {
            *balances.entry(t.from).or_insert(0) += t.amount;
            *balances.entry(t.to).or_insert(0) -= t.amount;
        }

        for (member_id, balance) in balances {
            prop_assert!(
                balance.abs() < SETTLEMENT_TOLERANCE,
                "member {member_id} left with balance {balance}"
            );
        }
    }

    /// Every transfer amount is a strictly positive integer.
    #[test]
    fn prop_transfer_amounts_strictly_positive(
        (members, expenses, splits) in ledger_strategy(),
    ) {
        let plan = calculate_settlement(&members, &expenses, &splits);

        for t in &plan {
            prop_assert!(t.amount > 0, "non-positive transfer amount {}", t.amount);
        }
    }

    /// A transfer never pays a member back to themselves.
    #[test]
    fn prop_no_self_transfers(
        (members, expenses, splits) in ledger_strategy(),
    ) {
        let plan = calculate_settlement(&members, &expenses, &splits);

        for t in &plan {
            prop_assert!(t.from != t.to);
        }
    }

    /// Expenses fully owed by their payer net to zero and produce no plan.
    #[test]
    fn prop_self_paid_expenses_need_no_transfers(
        (members, mut expenses, _) in ledger_strategy(),
    ) {
        let splits: Vec<ExpenseSplit> = expenses
            .iter()
            .filter(|e| e.amount > 0)
            .map(|e| ExpenseSplit {
                expense_id: e.id,
                member_id: e.payer_member_id,
                owed_amount: e.amount,
            })
            .collect();
        expenses.retain(|e| e.amount > 0);

        let plan = calculate_settlement(&members, &expenses, &splits);

        prop_assert!(plan.is_empty(), "balanced ledger produced {} transfers", plan.len());
    }

    /// Reordering the input collections never changes the emitted plan.
    #[test]
    fn prop_plan_independent_of_input_order(
        (members, expenses, splits) in ledger_strategy(),
    ) {
        let plan = calculate_settlement(&members, &expenses, &splits);

        let mut members_rev = members.clone();
        let mut expenses_rev = expenses.clone();
        let mut splits_rev = splits.clone();
        members_rev.reverse();
        expenses_rev.reverse();
        splits_rev.reverse();

        let plan_rev = calculate_settlement(&members_rev, &expenses_rev, &splits_rev);

        prop_assert_eq!(plan, plan_rev);
    }

    /// The plan never needs more transfers than debtors + creditors - 1,
    /// the bound the greedy pairing guarantees.
    #[test]
    fn prop_transfer_count_bounded(
        (members, expenses, splits) in ledger_strategy(),
    ) {
        let balances = net_balances(&members, &expenses, &splits);
        let debtors = balances.values().filter(|b| **b <= -SETTLEMENT_TOLERANCE).count();
        let creditors = balances.values().filter(|b| **b >= SETTLEMENT_TOLERANCE).count();

        let plan = calculate_settlement(&members, &expenses, &splits);

        let bound = (debtors + creditors).saturating_sub(1);
        prop_assert!(
            plan.len() <= bound,
            "{} transfers exceeds bound {bound}",
            plan.len()
        );
    }
}
