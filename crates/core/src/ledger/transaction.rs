//! Ledger transaction rows with stored running balances.

use chrono::{DateTime, Utc};
use meezan_shared::types::{AccountId, DocumentId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The three parallel ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Safe movements (money).
    Cash,
    /// Customer and supplier accounts (money).
    Counterparty,
    /// Product stock (base quantities).
    Stock,
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Counterparty => write!(f, "counterparty"),
            Self::Stock => write!(f, "stock"),
        }
    }
}

/// Business meaning of a ledger transaction.
///
/// This is the union of the three per-ledger enumerations; `applies_to`
/// says which ledgers accept a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Sale invoice (cash and counterparty ledgers).
    SaleInvoice,
    /// Purchase invoice (cash and counterparty ledgers).
    PurchaseInvoice,
    /// Sale return invoice (cash and counterparty ledgers).
    SaleReturnInvoice,
    /// Purchase return invoice (cash and counterparty ledgers).
    PurchaseReturnInvoice,
    /// Receipt from a customer.
    Collection,
    /// Payment to a supplier.
    Payment,
    /// Manual deposit into a safe.
    Deposit,
    /// Manual withdrawal from a safe.
    Withdrawal,
    /// Expense voucher.
    Expense,
    /// Income voucher.
    Income,
    /// Stock leaving on a sale or issue permit.
    Sale,
    /// Stock arriving on a purchase or receive permit.
    Purchase,
    /// Stock returned by a customer.
    SaleReturn,
    /// Stock sent back to a supplier.
    PurchaseReturn,
    /// Manual stock adjustment.
    Adjustment,
}

impl TransactionKind {
    /// Whether this kind may be recorded against the given ledger.
    #[must_use]
    pub fn applies_to(&self, ledger: LedgerKind) -> bool {
        match ledger {
            LedgerKind::Cash => matches!(
                self,
                Self::SaleInvoice
                    | Self::PurchaseInvoice
                    | Self::SaleReturnInvoice
                    | Self::PurchaseReturnInvoice
                    | Self::Collection
                    | Self::Payment
                    | Self::Deposit
                    | Self::Withdrawal
                    | Self::Expense
                    | Self::Income
            ),
            LedgerKind::Counterparty => matches!(
                self,
                Self::SaleInvoice
                    | Self::PurchaseInvoice
                    | Self::SaleReturnInvoice
                    | Self::PurchaseReturnInvoice
                    | Self::Collection
                    | Self::Payment
            ),
            LedgerKind::Stock => matches!(
                self,
                Self::Sale
                    | Self::Purchase
                    | Self::SaleReturn
                    | Self::PurchaseReturn
                    | Self::Adjustment
            ),
        }
    }
}

/// One typed movement against a ledger account.
///
/// `balance_before`/`balance_after` are derived: they are written only by
/// balance recalculation and retained as stored for statements and audit.
/// The stored `amount` may be negative (settlement rows document their
/// direction that way); recalculation applies the rules-table sign to the
/// magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// The transaction ID.
    pub id: TransactionId,
    /// The account this movement belongs to.
    pub account_id: AccountId,
    /// Store-assigned insertion counter, used as the date tiebreak.
    pub seq: u64,
    /// When the movement happened. Not necessarily monotonic with
    /// insertion order; backdated rows are expected.
    pub date: DateTime<Utc>,
    /// Money (2 dp) or base stock quantity (3 dp).
    pub amount: Decimal,
    /// Business meaning of the movement.
    pub kind: TransactionKind,
    /// Account balance before this movement.
    pub balance_before: Decimal,
    /// Account balance after this movement.
    pub balance_after: Decimal,
    /// The document that created this movement, if any.
    pub document_id: Option<DocumentId>,
    /// Counterpart contact for safe rows created by invoices/payments.
    pub contact_id: Option<AccountId>,
    /// Document number or other external reference.
    pub reference: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}
