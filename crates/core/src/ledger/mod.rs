//! Ledger accounts, transaction stores, and balance recalculation.
//!
//! This module implements the three parallel ledgers:
//! - Accounts (safes, contacts, products) with initial and cached balances
//! - Transaction rows carrying stored before/after balances
//! - The document rules table mapping transaction kinds to signed effects
//! - Full-replay balance recalculation
//! - The in-memory store tying them together

pub mod account;
pub mod error;
pub mod replay;
pub mod rules;
pub mod store;
pub mod transaction;

#[cfg(test)]
mod replay_props;

pub use account::{AccountKind, ContactRole, LedgerAccount, ProductUnit};
pub use error::LedgerError;
pub use rules::{Effect, effect_of};
pub use store::{LedgerStore, NewTransaction};
pub use transaction::{LedgerKind, LedgerTransaction, TransactionKind};
