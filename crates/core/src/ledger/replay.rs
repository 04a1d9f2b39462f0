//! Full-replay balance recalculation.
//!
//! Balances are always a pure function of the initial balance and the
//! chronologically-ordered transaction list. Every mutation replays the
//! whole history; an incremental variant would have to reproduce these
//! results exactly.

use rust_decimal::Decimal;

use super::account::AccountKind;
use super::rules::effect_of;
use super::transaction::LedgerTransaction;

/// Sorts transactions chronologically: by date ascending, ties broken by
/// insertion order.
pub fn sort_chronologically(transactions: &mut [LedgerTransaction]) {
    transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.seq.cmp(&b.seq)));
}

/// Replays an account's transactions from its initial balance.
///
/// Rewrites `balance_before`/`balance_after` on every row in order and
/// returns the closing balance (the initial balance when the list is
/// empty). The slice must already be in chronological order. Idempotent:
/// replaying a replayed list changes nothing.
pub fn replay(
    kind: AccountKind,
    initial_balance: Decimal,
    transactions: &mut [LedgerTransaction],
) -> Decimal {
    let mut running = initial_balance;

    for transaction in transactions {
        transaction.balance_before = running;
        transaction.balance_after =
            effect_of(kind, transaction.kind).apply(running, transaction.amount);
        running = transaction.balance_after;
    }

    running
}
