//! Ledger accounts: safes, contacts, and products.

use meezan_shared::types::{AccountId, UnitId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::LedgerKind;

/// Role of a counterparty account.
///
/// The role decides which transaction kinds move the balance: a customer's
/// debt grows with sale invoices, a supplier's with purchase invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    /// A customer who owes the business.
    Customer,
    /// A supplier the business owes.
    Supplier,
}

/// The concrete kind of a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// A cash box holding money.
    Safe,
    /// A customer or supplier account.
    Contact(ContactRole),
    /// A product's stock balance in base units.
    Product,
}

impl AccountKind {
    /// The ledger this account belongs to.
    #[must_use]
    pub fn ledger(&self) -> LedgerKind {
        match self {
            Self::Safe => LedgerKind::Cash,
            Self::Contact(_) => LedgerKind::Counterparty,
            Self::Product => LedgerKind::Stock,
        }
    }
}

/// One ledger account: a safe, a contact, or a product.
///
/// `current_balance` is a derived cache: it always equals the
/// `balance_after` of the chronologically-last transaction, or
/// `initial_balance` when no transactions exist. Only balance
/// recalculation writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// The account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// What kind of account this is.
    pub kind: AccountKind,
    /// Balance before any transactions.
    pub initial_balance: Decimal,
    /// Cached closing balance, maintained by recalculation.
    pub current_balance: Decimal,
}

impl LedgerAccount {
    /// Creates a new account with its current balance equal to the
    /// initial balance.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AccountKind, initial_balance: Decimal) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            kind,
            initial_balance,
            current_balance: initial_balance,
        }
    }
}

/// A unit of measure for one product.
///
/// Lines on invoices and stock permits are quantified in a unit; the stock
/// ledger stores the base quantity (`quantity * conversion_factor`). The
/// unit also carries the list prices targeted by the price-update switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUnit {
    /// The unit ID.
    pub id: UnitId,
    /// The product account this unit measures.
    pub product_id: AccountId,
    /// Display name, e.g. "carton" or "piece".
    pub name: String,
    /// Multiplier into base units. The base unit has factor 1.
    pub conversion_factor: Decimal,
    /// Current list purchase price per unit.
    pub purchase_price: Decimal,
    /// Current list sale price per unit.
    pub sale_price: Decimal,
}

impl ProductUnit {
    /// Creates a new unit for a product.
    #[must_use]
    pub fn new(
        product_id: AccountId,
        name: impl Into<String>,
        conversion_factor: Decimal,
        purchase_price: Decimal,
        sale_price: Decimal,
    ) -> Self {
        Self {
            id: UnitId::new(),
            product_id,
            name: name.into(),
            conversion_factor,
            purchase_price,
            sale_price,
        }
    }
}
