//! In-memory ledger store.
//!
//! Holds accounts, product units, and the transaction rows of all three
//! ledgers. Every append or remove synchronously recalculates the touched
//! account, so stored `balance_before`/`balance_after` values and the
//! account's cached balance never drift from a full replay.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use meezan_shared::types::{AccountId, DocumentId, TransactionId, UnitId};
use rust_decimal::Decimal;
use tracing::debug;

use super::account::{LedgerAccount, ProductUnit};
use super::error::LedgerError;
use super::replay::{replay, sort_chronologically};
use super::transaction::{LedgerTransaction, TransactionKind};

/// Input for appending one ledger transaction.
///
/// `balance_before`/`balance_after` are absent: callers never author
/// them, recalculation does.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The account to record against.
    pub account_id: AccountId,
    /// When the movement happened.
    pub date: DateTime<Utc>,
    /// Money (2 dp) or base stock quantity (3 dp). May be negative for
    /// settlement rows.
    pub amount: Decimal,
    /// Business meaning of the movement.
    pub kind: TransactionKind,
    /// Originating document, if any.
    pub document_id: Option<DocumentId>,
    /// Counterpart contact for safe rows.
    pub contact_id: Option<AccountId>,
    /// External reference, usually the document number.
    pub reference: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// In-memory store for accounts, units, and ledger transactions.
///
/// Cloning the store snapshots it; the posting engine relies on that for
/// its atomic boundaries.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    accounts: HashMap<AccountId, LedgerAccount>,
    units: HashMap<UnitId, ProductUnit>,
    transactions: HashMap<TransactionId, LedgerTransaction>,
    next_seq: u64,
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account.
    pub fn insert_account(&mut self, account: LedgerAccount) {
        self.accounts.insert(account.id, account);
    }

    /// Registers a product unit.
    pub fn insert_unit(&mut self, unit: ProductUnit) {
        self.units.insert(unit.id, unit);
    }

    /// Looks up an account.
    pub fn account(&self, id: AccountId) -> Result<&LedgerAccount, LedgerError> {
        self.accounts
            .get(&id)
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Looks up a product unit.
    pub fn unit(&self, id: UnitId) -> Result<&ProductUnit, LedgerError> {
        self.units.get(&id).ok_or(LedgerError::UnitNotFound(id))
    }

    /// Looks up a product unit for mutation (price updates).
    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut ProductUnit, LedgerError> {
        self.units.get_mut(&id).ok_or(LedgerError::UnitNotFound(id))
    }

    /// Looks up a transaction row.
    pub fn transaction(&self, id: TransactionId) -> Result<&LedgerTransaction, LedgerError> {
        self.transactions
            .get(&id)
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    /// Appends a transaction and recalculates the touched account.
    ///
    /// Rejects kinds that do not belong to the account's ledger.
    pub fn append_transaction(
        &mut self,
        input: NewTransaction,
    ) -> Result<TransactionId, LedgerError> {
        let account = self.account(input.account_id)?;
        let ledger = account.kind.ledger();
        if !input.kind.applies_to(ledger) {
            return Err(LedgerError::KindMismatch {
                ledger,
                kind: input.kind,
            });
        }

        self.next_seq += 1;
        let transaction = LedgerTransaction {
            id: TransactionId::new(),
            account_id: input.account_id,
            seq: self.next_seq,
            date: input.date,
            amount: input.amount,
            kind: input.kind,
            balance_before: Decimal::ZERO,
            balance_after: Decimal::ZERO,
            document_id: input.document_id,
            contact_id: input.contact_id,
            reference: input.reference,
            description: input.description,
        };
        let id = transaction.id;

        debug!(
            transaction_id = %id,
            account_id = %input.account_id,
            kind = ?input.kind,
            amount = %input.amount,
            "Ledger transaction appended"
        );

        self.transactions.insert(id, transaction);
        self.recalculate(input.account_id)?;

        Ok(id)
    }

    /// Removes a transaction and recalculates its account.
    pub fn remove_transaction(&mut self, id: TransactionId) -> Result<(), LedgerError> {
        let transaction = self
            .transactions
            .remove(&id)
            .ok_or(LedgerError::TransactionNotFound(id))?;

        debug!(
            transaction_id = %id,
            account_id = %transaction.account_id,
            kind = ?transaction.kind,
            "Ledger transaction removed"
        );

        self.recalculate(transaction.account_id)
    }

    /// Returns an account's transactions in chronological order, with
    /// stored before/after balances verbatim.
    pub fn transactions_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        self.account(account_id)?;

        let mut rows: Vec<LedgerTransaction> = self
            .transactions
            .values()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect();
        sort_chronologically(&mut rows);

        Ok(rows)
    }

    /// Returns an account's cached closing balance.
    pub fn current_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        Ok(self.account(account_id)?.current_balance)
    }

    /// Replays the account's full history and rewrites every stored
    /// before/after balance plus the cached closing balance.
    fn recalculate(&mut self, account_id: AccountId) -> Result<(), LedgerError> {
        let account = self.account(account_id)?;
        let kind = account.kind;
        let initial_balance = account.initial_balance;

        let mut rows = self.transactions_for(account_id)?;
        let closing = replay(kind, initial_balance, &mut rows);

        for row in rows {
            let id = row.id;
            self.transactions.insert(id, row);
        }

        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        account.current_balance = closing;

        debug!(
            account_id = %account_id,
            current_balance = %closing,
            "Account balances recalculated"
        );

        Ok(())
    }
}
