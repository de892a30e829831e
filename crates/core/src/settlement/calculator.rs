//! Settlement calculation.
//!
//! Pure, synchronous, deterministic: no I/O, no state, total over its
//! inputs. Validation of the inputs (non-negative amounts, splits summing
//! to their expense, known member ids) belongs to the calling layer.

use std::collections::BTreeMap;

use splitpot_shared::types::MemberId;

use super::types::{Expense, ExpenseSplit, Member, Transfer};

/// Balances within this many minor units of zero count as settled.
///
/// Absorbs sub-unit residue from split rounding so a one-unit leftover
/// never produces a transfer on its own.
pub const SETTLEMENT_TOLERANCE: i64 = 1;

/// Computes every member's net balance in minor units.
///
/// Positive = net creditor (should receive money), negative = net debtor
/// (should pay money), zero = already settled. Expenses credit the payer;
/// splits debit the owing member. The two passes touch disjoint balance
/// terms, so their order is irrelevant.
///
/// Ids referenced by an expense or split but absent from `members` still
/// receive a balance entry.
#[must_use]
pub fn net_balances(
    members: &[Member],
    expenses: &[Expense],
    splits: &[ExpenseSplit],
) -> BTreeMap<MemberId, i64> {
    let mut balances: BTreeMap<MemberId, i64> = members.iter().map(|m| (m.id, 0)).collect();

    for expense in expenses {
        *balances.entry(expense.payer_member_id).or_insert(0) += expense.amount;
    }

    for split in splits {
        *balances.entry(split.member_id).or_insert(0) -= split.owed_amount;
    }

    balances
}

/// Computes a settlement plan: a small list of directed transfers that
/// zeroes out every member's net balance.
///
/// Debtors are matched against creditors greedily, largest against
/// largest, which keeps the transfer count low (not provably minimal;
/// optimal netting is NP-hard). O(n log n) in the member count.
///
/// Emission order is fixed by the sort below: ties on balance break by
/// member id, so identical inputs always yield the identical plan.
#[must_use]
pub fn calculate_settlement(
    members: &[Member],
    expenses: &[Expense],
    splits: &[ExpenseSplit],
) -> Vec<Transfer> {
    let balances = net_balances(members, expenses, splits);

    let mut debtors: Vec<(MemberId, i64)> = Vec::new();
    let mut creditors: Vec<(MemberId, i64)> = Vec::new();

    for (member_id, balance) in balances {
        if balance <= -SETTLEMENT_TOLERANCE {
            debtors.push((member_id, balance));
        } else if balance >= SETTLEMENT_TOLERANCE {
            creditors.push((member_id, balance));
        }
    }

    // Largest debt first / largest credit first.
    debtors.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let (debtor_id, debtor_balance) = debtors[i];
        let (creditor_id, creditor_balance) = creditors[j];

        // The smaller side of the pairing is fully resolved.
        let amount = (-debtor_balance).min(creditor_balance);

        if amount > 0 {
            transfers.push(Transfer {
                from: debtor_id,
                to: creditor_id,
                amount,
            });
        }

        debtors[i].1 += amount;
        creditors[j].1 -= amount;

        if debtors[i].1.abs() < SETTLEMENT_TOLERANCE {
            i += 1;
        }
        if creditors[j].1 < SETTLEMENT_TOLERANCE {
            j += 1;
        }
    }

    transfers
}
