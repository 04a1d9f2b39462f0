//! Property-based tests for balance recalculation.

use chrono::{Duration, TimeZone, Utc};
use meezan_shared::types::{AccountId, TransactionId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::account::AccountKind;
use super::replay::{replay, sort_chronologically};
use super::rules::effect_of;
use super::transaction::{LedgerTransaction, TransactionKind};

/// Strategy for cash-ledger transaction kinds.
fn cash_kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop::sample::select(vec![
        TransactionKind::SaleInvoice,
        TransactionKind::PurchaseInvoice,
        TransactionKind::SaleReturnInvoice,
        TransactionKind::PurchaseReturnInvoice,
        TransactionKind::Collection,
        TransactionKind::Payment,
        TransactionKind::Deposit,
        TransactionKind::Withdrawal,
        TransactionKind::Expense,
        TransactionKind::Income,
    ])
}

/// Strategy for one unreplayed safe transaction: a kind, an amount (2 dp,
/// possibly negative like stored settlement rows), and a day offset.
fn safe_row_strategy() -> impl Strategy<Value = (TransactionKind, Decimal, i64)> {
    (
        cash_kind_strategy(),
        (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        0i64..365,
    )
}

fn build_rows(account_id: AccountId, rows: &[(TransactionKind, Decimal, i64)]) -> Vec<LedgerTransaction> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, (kind, amount, day))| LedgerTransaction {
            id: TransactionId::new(),
            account_id,
            seq: i as u64 + 1,
            date: base + Duration::days(*day),
            amount: *amount,
            kind: *kind,
            balance_before: Decimal::ZERO,
            balance_after: Decimal::ZERO,
            document_id: None,
            contact_id: None,
            reference: None,
            description: None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Replay invariant: `balance_before[0]` equals the initial balance,
    /// every row's after equals its before with the rules-table effect
    /// applied, and consecutive rows chain exactly.
    #[test]
    fn prop_replay_invariant(
        initial in (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        rows in prop::collection::vec(safe_row_strategy(), 1..30),
    ) {
        let account_id = AccountId::new();
        let mut transactions = build_rows(account_id, &rows);
        sort_chronologically(&mut transactions);

        let closing = replay(AccountKind::Safe, initial, &mut transactions);

        prop_assert_eq!(transactions[0].balance_before, initial);
        for row in &transactions {
            let expected = effect_of(AccountKind::Safe, row.kind).apply(row.balance_before, row.amount);
            prop_assert_eq!(row.balance_after, expected);
        }
        for pair in transactions.windows(2) {
            prop_assert_eq!(pair[1].balance_before, pair[0].balance_after);
        }
        prop_assert_eq!(closing, transactions.last().unwrap().balance_after);
    }

    /// Idempotence: replaying a replayed list yields identical stored
    /// values and the same closing balance.
    #[test]
    fn prop_replay_idempotent(
        initial in (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        rows in prop::collection::vec(safe_row_strategy(), 0..30),
    ) {
        let account_id = AccountId::new();
        let mut transactions = build_rows(account_id, &rows);
        sort_chronologically(&mut transactions);

        let first = replay(AccountKind::Safe, initial, &mut transactions);
        let snapshot: Vec<(Decimal, Decimal)> = transactions
            .iter()
            .map(|t| (t.balance_before, t.balance_after))
            .collect();

        let second = replay(AccountKind::Safe, initial, &mut transactions);
        let again: Vec<(Decimal, Decimal)> = transactions
            .iter()
            .map(|t| (t.balance_before, t.balance_after))
            .collect();

        prop_assert_eq!(first, second);
        prop_assert_eq!(snapshot, again);
    }

    /// Backdating: inserting a row dated before all existing rows shifts
    /// every later before/after value by exactly the new row's signed
    /// effect.
    #[test]
    fn prop_backdated_insert_shifts_history(
        initial in (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        rows in prop::collection::vec(safe_row_strategy(), 1..20),
        inserted_kind in cash_kind_strategy(),
        inserted_amount in (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
    ) {
        let account_id = AccountId::new();
        let mut transactions = build_rows(account_id, &rows);
        // Push all existing rows a year later so the insert is strictly earliest.
        for t in &mut transactions {
            t.date += Duration::days(400);
        }
        sort_chronologically(&mut transactions);
        replay(AccountKind::Safe, initial, &mut transactions);
        let before: Vec<(Decimal, Decimal)> = transactions
            .iter()
            .map(|t| (t.balance_before, t.balance_after))
            .collect();

        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        transactions.push(LedgerTransaction {
            id: TransactionId::new(),
            account_id,
            seq: transactions.len() as u64 + 1,
            date: base,
            amount: inserted_amount,
            kind: inserted_kind,
            balance_before: Decimal::ZERO,
            balance_after: Decimal::ZERO,
            document_id: None,
            contact_id: None,
            reference: None,
            description: None,
        });
        sort_chronologically(&mut transactions);
        replay(AccountKind::Safe, initial, &mut transactions);

        let shift = effect_of(AccountKind::Safe, inserted_kind).apply(Decimal::ZERO, inserted_amount);
        for (old, row) in before.iter().zip(transactions.iter().skip(1)) {
            prop_assert_eq!(row.balance_before, old.0 + shift);
            prop_assert_eq!(row.balance_after, old.1 + shift);
        }
    }
}
