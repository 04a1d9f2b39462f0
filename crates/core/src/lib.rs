//! Ledger posting and balance recalculation engine for Meezan.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. It maintains running balances for three parallel ledgers
//! (safes, contacts, products) and drives the posting state machine that
//! materializes business documents as ledger transactions.
//!
//! # Modules
//!
//! - `ledger` - Accounts, transaction stores, and balance recalculation
//! - `document` - Business documents and their derived totals
//! - `posting` - The post/unpost state machine and document rules

pub mod document;
pub mod ledger;
pub mod posting;
