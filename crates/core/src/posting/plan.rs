//! Document-side rules: which ledger rows a document produces.
//!
//! `build_plan` turns a document into the exact list of transactions its
//! kind requires, and `ExpectedCounts` states the same requirement as
//! per-ledger counts so the engine can verify that posting created
//! everything before committing.

use meezan_shared::types::round_quantity;
use rust_decimal::Decimal;

use super::error::PostingError;
use crate::document::types::{Document, DocumentDetails, PaymentTerms};
use crate::ledger::{LedgerStore, NewTransaction, TransactionKind};

/// Where a created row links back into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The primary counterparty row.
    Contact,
    /// The settlement counterparty row.
    Settlement,
    /// The safe row.
    Safe,
    /// One of the per-line stock rows.
    Stock,
}

/// One ledger row a document will create when posted.
#[derive(Debug, Clone)]
pub struct PlannedTransaction {
    /// Which backlink the created row fills.
    pub slot: Slot,
    /// The append input.
    pub input: NewTransaction,
}

/// Per-ledger row counts a posted document must own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedCounts {
    /// Counterparty-ledger rows.
    pub counterparty: usize,
    /// Cash-ledger rows.
    pub cash: usize,
    /// Stock-ledger rows.
    pub stock: usize,
}

impl ExpectedCounts {
    /// Counts required by the document rules for this document.
    #[must_use]
    pub fn of(details: &DocumentDetails) -> Self {
        match details {
            DocumentDetails::Invoice(invoice) => {
                let settled = invoice.settled_amount() > Decimal::ZERO;
                let partial = settled && invoice.terms == PaymentTerms::Credit;
                Self {
                    counterparty: 1 + usize::from(partial),
                    cash: usize::from(settled),
                    stock: invoice.lines.len(),
                }
            }
            DocumentDetails::Payment(_) => Self {
                counterparty: 1,
                cash: 1,
                stock: 0,
            },
            DocumentDetails::Expense(_)
            | DocumentDetails::Income(_)
            | DocumentDetails::SafeDeposit(_)
            | DocumentDetails::SafeWithdrawal(_)
            | DocumentDetails::EmployeeLoan(_)
            | DocumentDetails::EmployeeSalary(_) => Self {
                counterparty: 0,
                cash: 1,
                stock: 0,
            },
            DocumentDetails::StockPermit(permit) => Self {
                counterparty: 0,
                cash: 0,
                stock: permit.lines.len(),
            },
        }
    }
}

/// Builds the ledger rows this document produces when posted.
///
/// The store is consulted for unit conversion factors; quantities are
/// converted to base units here so the stock ledger only ever sees base
/// quantities.
pub fn build_plan(
    document: &Document,
    store: &LedgerStore,
) -> Result<Vec<PlannedTransaction>, PostingError> {
    let mut plan = Vec::new();

    let row = |slot, account_id, kind, amount, contact_id, description: String| PlannedTransaction {
        slot,
        input: NewTransaction {
            account_id,
            date: document.date,
            amount,
            kind,
            document_id: Some(document.id),
            contact_id,
            reference: Some(document.number.clone()),
            description: Some(description),
        },
    };

    match &document.details {
        DocumentDetails::Invoice(invoice) => {
            let settled = invoice.settled_amount();

            // The receivable/payable movement. Cash terms leave the contact
            // balance untouched, so the row carries a zero amount but still
            // documents the invoice on the statement.
            let carried = match invoice.terms {
                PaymentTerms::Cash => Decimal::ZERO,
                PaymentTerms::Credit => invoice.net_amount,
            };
            plan.push(row(
                Slot::Contact,
                invoice.contact_id,
                invoice.flavor.invoice_kind(),
                carried,
                None,
                format!("Invoice {}", document.number),
            ));

            if settled > Decimal::ZERO {
                let safe_id = invoice
                    .safe_id
                    .ok_or(PostingError::MissingRequiredAccount("safe"))?;

                plan.push(row(
                    Slot::Safe,
                    safe_id,
                    invoice.flavor.invoice_kind(),
                    settled,
                    Some(invoice.contact_id),
                    format!("Cash settlement of invoice {}", document.number),
                ));

                // A partial settlement on credit terms also moves the
                // carried receivable/payable: collections and payments on
                // the forward flavors, refund legs on the returns. The row
                // stores its amount negated; the rules table supplies the
                // direction during replay. Cash terms never touched the
                // contact balance, so no settlement row is needed there.
                if invoice.terms == PaymentTerms::Credit {
                    plan.push(row(
                        Slot::Settlement,
                        invoice.contact_id,
                        invoice.flavor.settlement_kind(),
                        -settled,
                        None,
                        format!("Settlement of invoice {}", document.number),
                    ));
                }
            }

            for line in &invoice.lines {
                let unit = store.unit(line.unit_id)?;
                let base_quantity = round_quantity(line.quantity * unit.conversion_factor);
                plan.push(row(
                    Slot::Stock,
                    line.product_id,
                    invoice.flavor.stock_kind(),
                    base_quantity,
                    None,
                    format!("Stock movement from invoice {}", document.number),
                ));
            }
        }
        DocumentDetails::Payment(payment) => {
            let kind = payment.direction.transaction_kind();
            let description = match kind {
                TransactionKind::Collection => format!("Collection, document {}", document.number),
                _ => format!("Payment, document {}", document.number),
            };

            plan.push(row(
                Slot::Safe,
                payment.safe_id,
                kind,
                payment.amount,
                Some(payment.contact_id),
                description.clone(),
            ));
            plan.push(row(
                Slot::Contact,
                payment.contact_id,
                kind,
                -payment.amount,
                None,
                description,
            ));
        }
        DocumentDetails::Expense(voucher) => {
            plan.push(row(
                Slot::Safe,
                voucher.safe_id,
                TransactionKind::Expense,
                voucher.amount,
                None,
                format!("Expense: {} - {}", voucher.category, voucher.counterparty),
            ));
        }
        DocumentDetails::Income(voucher) => {
            plan.push(row(
                Slot::Safe,
                voucher.safe_id,
                TransactionKind::Income,
                voucher.amount,
                None,
                format!("Income: {} - {}", voucher.category, voucher.counterparty),
            ));
        }
        DocumentDetails::SafeDeposit(movement) => {
            plan.push(row(
                Slot::Safe,
                movement.safe_id,
                TransactionKind::Deposit,
                movement.amount,
                None,
                format!("Deposit into safe: {}", movement.counterparty),
            ));
        }
        DocumentDetails::SafeWithdrawal(movement) => {
            plan.push(row(
                Slot::Safe,
                movement.safe_id,
                TransactionKind::Withdrawal,
                movement.amount,
                None,
                format!("Withdrawal from safe: {}", movement.counterparty),
            ));
        }
        DocumentDetails::StockPermit(permit) => {
            for line in &permit.lines {
                let unit = store.unit(line.unit_id)?;
                let base_quantity = round_quantity(line.quantity * unit.conversion_factor);
                plan.push(row(
                    Slot::Stock,
                    line.product_id,
                    permit.direction.stock_kind(),
                    base_quantity,
                    None,
                    format!("Stock permit {} - {}", document.number, permit.person),
                ));
            }
        }
        DocumentDetails::EmployeeLoan(loan) => {
            plan.push(row(
                Slot::Safe,
                loan.safe_id,
                TransactionKind::Withdrawal,
                loan.amount,
                None,
                format!("Employee loan: {}", loan.employee),
            ));
        }
        DocumentDetails::EmployeeSalary(salary) => {
            plan.push(row(
                Slot::Safe,
                salary.safe_id,
                TransactionKind::Withdrawal,
                salary.net_salary,
                None,
                format!("Employee salary: {}", salary.employee),
            ));
        }
    }

    Ok(plan)
}
