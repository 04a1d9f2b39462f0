//! Business documents and their kind-specific details.

use chrono::{DateTime, Utc};
use meezan_shared::types::{AccountId, DocumentId, TransactionId, UnitId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{ContactRole, TransactionKind};

/// The four invoice flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceFlavor {
    /// Goods sold to a customer.
    Sale,
    /// Goods bought from a supplier.
    Purchase,
    /// Goods returned by a customer.
    SaleReturn,
    /// Goods returned to a supplier.
    PurchaseReturn,
}

impl InvoiceFlavor {
    /// Kind of the invoice's primary contact and safe rows.
    #[must_use]
    pub fn invoice_kind(&self) -> TransactionKind {
        match self {
            Self::Sale => TransactionKind::SaleInvoice,
            Self::Purchase => TransactionKind::PurchaseInvoice,
            Self::SaleReturn => TransactionKind::SaleReturnInvoice,
            Self::PurchaseReturn => TransactionKind::PurchaseReturnInvoice,
        }
    }

    /// Kind of the settlement contact row: the cash leg moves in on
    /// sales and purchase returns, out on purchases and sale returns.
    #[must_use]
    pub fn settlement_kind(&self) -> TransactionKind {
        match self {
            Self::Sale | Self::PurchaseReturn => TransactionKind::Collection,
            Self::Purchase | Self::SaleReturn => TransactionKind::Payment,
        }
    }

    /// Kind of the per-line stock rows.
    #[must_use]
    pub fn stock_kind(&self) -> TransactionKind {
        match self {
            Self::Sale => TransactionKind::Sale,
            Self::Purchase => TransactionKind::Purchase,
            Self::SaleReturn => TransactionKind::SaleReturn,
            Self::PurchaseReturn => TransactionKind::PurchaseReturn,
        }
    }

    /// The contact role this flavor is written against.
    #[must_use]
    pub fn contact_role(&self) -> ContactRole {
        match self {
            Self::Sale | Self::SaleReturn => ContactRole::Customer,
            Self::Purchase | Self::PurchaseReturn => ContactRole::Supplier,
        }
    }
}

/// How an invoice is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    /// The full net amount settles from a safe at posting time.
    Cash,
    /// The net amount carries on the counterparty account; partial
    /// payments are allowed.
    Credit,
}

/// One invoice line.
///
/// The trailing amount fields are derived from quantity, price, and the
/// percentage rates; callers never author them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// The product sold or bought.
    pub product_id: AccountId,
    /// The unit the quantity is expressed in.
    pub unit_id: UnitId,
    /// Quantity in the chosen unit.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Discount as a percentage of the line total.
    pub discount_percentage: Decimal,
    /// Tax as a percentage of the discounted line total.
    pub tax_percentage: Decimal,
    /// Derived: `quantity * unit_price`.
    pub total_price: Decimal,
    /// Derived: discount portion of the line total.
    pub discount_amount: Decimal,
    /// Derived: tax on the discounted total.
    pub tax_amount: Decimal,
    /// Derived: `total - discount + tax`.
    pub net_price: Decimal,
}

impl InvoiceLine {
    /// Creates a line with zeroed derived amounts; totals calculation
    /// fills them in.
    #[must_use]
    pub fn new(
        product_id: AccountId,
        unit_id: UnitId,
        quantity: Decimal,
        unit_price: Decimal,
        discount_percentage: Decimal,
        tax_percentage: Decimal,
    ) -> Self {
        Self {
            product_id,
            unit_id,
            quantity,
            unit_price,
            discount_percentage,
            tax_percentage,
            total_price: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            net_price: Decimal::ZERO,
        }
    }
}

/// Invoice-specific document fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetails {
    /// Which of the four invoice flavors this is.
    pub flavor: InvoiceFlavor,
    /// Cash or credit settlement.
    pub terms: PaymentTerms,
    /// The customer or supplier.
    pub contact_id: AccountId,
    /// The safe the settled portion moves through. Required whenever a
    /// settled portion exists.
    pub safe_id: Option<AccountId>,
    /// Line items.
    pub lines: Vec<InvoiceLine>,
    /// Derived: sum of line totals.
    pub total_amount: Decimal,
    /// Derived: sum of line discounts.
    pub discount_amount: Decimal,
    /// Derived: sum of line taxes.
    pub tax_amount: Decimal,
    /// Derived: `total - discount + tax`.
    pub net_amount: Decimal,
    /// Amount settled so far. Cash terms force this to the net amount.
    pub paid_amount: Decimal,
    /// Derived: `net - paid`.
    pub remaining_amount: Decimal,
}

impl InvoiceDetails {
    /// The portion that moves through a safe at posting time: the full
    /// net amount for cash terms, the paid amount otherwise.
    #[must_use]
    pub fn settled_amount(&self) -> Decimal {
        match self.terms {
            PaymentTerms::Cash => self.net_amount,
            PaymentTerms::Credit => self.paid_amount,
        }
    }
}

/// Direction of a standalone payment document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// Money received from a customer.
    Receipt,
    /// Money paid out to a supplier.
    Disbursement,
}

impl PaymentDirection {
    /// Kind for both the safe row and the contact row.
    #[must_use]
    pub fn transaction_kind(&self) -> TransactionKind {
        match self {
            Self::Receipt => TransactionKind::Collection,
            Self::Disbursement => TransactionKind::Payment,
        }
    }
}

/// Receipt or disbursement against a contact, optionally tied to an
/// invoice whose paid/remaining amounts it adjusts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Receipt or disbursement.
    pub direction: PaymentDirection,
    /// Amount of money moved.
    pub amount: Decimal,
    /// The customer or supplier.
    pub contact_id: AccountId,
    /// The safe the money moves through.
    pub safe_id: AccountId,
    /// Invoice to settle against, if any.
    pub invoice_id: Option<DocumentId>,
}

/// Expense or income voucher fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherDetails {
    /// Amount of money moved.
    pub amount: Decimal,
    /// The safe the money moves through.
    pub safe_id: AccountId,
    /// Category name from the master data.
    pub category: String,
    /// Payee (expense) or payer (income).
    pub counterparty: String,
}

/// Manual safe deposit or withdrawal fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeMovementDetails {
    /// Amount of money moved.
    pub amount: Decimal,
    /// The safe the money moves through.
    pub safe_id: AccountId,
    /// Deposit source or withdrawal destination.
    pub counterparty: String,
}

/// Direction of a stock permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermitDirection {
    /// Stock leaves the store.
    Issue,
    /// Stock arrives at the store.
    Receive,
}

impl PermitDirection {
    /// Kind of the per-line stock rows.
    #[must_use]
    pub fn stock_kind(&self) -> TransactionKind {
        match self {
            Self::Issue => TransactionKind::Sale,
            Self::Receive => TransactionKind::Purchase,
        }
    }
}

/// One stock permit line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermitLine {
    /// The product moved.
    pub product_id: AccountId,
    /// The unit the quantity is expressed in.
    pub unit_id: UnitId,
    /// Quantity in the chosen unit.
    pub quantity: Decimal,
}

/// Stock issue/receive permit fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPermitDetails {
    /// Issue or receive.
    pub direction: PermitDirection,
    /// Recipient (issue) or sender (receive).
    pub person: String,
    /// Line items.
    pub lines: Vec<PermitLine>,
}

/// Employee loan fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeLoanDetails {
    /// Employee name.
    pub employee: String,
    /// Loan amount.
    pub amount: Decimal,
    /// The safe the loan is disbursed from.
    pub safe_id: AccountId,
}

/// Employee salary fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSalaryDetails {
    /// Employee name.
    pub employee: String,
    /// Gross salary.
    pub base_salary: Decimal,
    /// General deductions.
    pub deductions: Decimal,
    /// Deduction covering outstanding loans.
    pub loans_deduction: Decimal,
    /// Derived: `base - deductions - loans_deduction`.
    pub net_salary: Decimal,
    /// The safe the salary is disbursed from.
    pub safe_id: AccountId,
}

/// Kind-specific document payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentDetails {
    /// Sales/purchase invoice or return.
    Invoice(InvoiceDetails),
    /// Receipt from a customer or payment to a supplier.
    Payment(PaymentDetails),
    /// Expense voucher.
    Expense(VoucherDetails),
    /// Income voucher.
    Income(VoucherDetails),
    /// Manual deposit into a safe.
    SafeDeposit(SafeMovementDetails),
    /// Manual withdrawal from a safe.
    SafeWithdrawal(SafeMovementDetails),
    /// Stock issue/receive permit.
    StockPermit(StockPermitDetails),
    /// Loan disbursed to an employee.
    EmployeeLoan(EmployeeLoanDetails),
    /// Salary disbursed to an employee.
    EmployeeSalary(EmployeeSalaryDetails),
}

impl DocumentDetails {
    /// Short name for logging and error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Invoice(_) => "invoice",
            Self::Payment(_) => "payment",
            Self::Expense(_) => "expense",
            Self::Income(_) => "income",
            Self::SafeDeposit(_) => "safe_deposit",
            Self::SafeWithdrawal(_) => "safe_withdrawal",
            Self::StockPermit(_) => "stock_permit",
            Self::EmployeeLoan(_) => "employee_loan",
            Self::EmployeeSalary(_) => "employee_salary",
        }
    }

    /// Whether documents of this kind post automatically on creation.
    ///
    /// Permits and employee documents stay unposted until explicitly
    /// posted; everything else posts as part of creation.
    #[must_use]
    pub fn auto_posts(&self) -> bool {
        !matches!(
            self,
            Self::StockPermit(_) | Self::EmployeeLoan(_) | Self::EmployeeSalary(_)
        )
    }
}

/// Backlinks to the ledger transactions a posted document owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnedTransactions {
    /// The primary counterparty row.
    pub contact: Option<TransactionId>,
    /// The settlement counterparty row for the cash-settled portion.
    pub settlement: Option<TransactionId>,
    /// The safe row.
    pub safe: Option<TransactionId>,
    /// One stock row per line item.
    pub stock: Vec<TransactionId>,
}

impl OwnedTransactions {
    /// All owned transaction IDs.
    #[must_use]
    pub fn all(&self) -> Vec<TransactionId> {
        let mut ids = Vec::new();
        ids.extend(self.stock.iter().copied());
        ids.extend(self.settlement);
        ids.extend(self.contact);
        ids.extend(self.safe);
        ids
    }

    /// True when no links are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contact.is_none()
            && self.settlement.is_none()
            && self.safe.is_none()
            && self.stock.is_empty()
    }

    /// Drops every link.
    pub fn clear(&mut self) {
        self.contact = None;
        self.settlement = None;
        self.safe = None;
        self.stock.clear();
    }
}

/// A business document: common envelope plus kind-specific details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The document ID.
    pub id: DocumentId,
    /// Document number shown to users.
    pub number: String,
    /// Document date; ledger rows inherit it.
    pub date: DateTime<Utc>,
    /// External reference, if any.
    pub reference: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Whether the document's ledger effect is currently materialized.
    pub is_posted: bool,
    /// Kind-specific payload.
    pub details: DocumentDetails,
    /// Links to the ledger rows created at posting time.
    pub owned: OwnedTransactions,
}

/// Intake envelope for creating or updating a document.
#[derive(Debug, Clone)]
pub struct DocumentDraft {
    /// Document number shown to users.
    pub number: String,
    /// Document date.
    pub date: DateTime<Utc>,
    /// External reference, if any.
    pub reference: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Kind-specific payload; derived fields may be left zeroed.
    pub details: DocumentDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invoice_flavor_kinds() {
        assert_eq!(
            InvoiceFlavor::Sale.invoice_kind(),
            TransactionKind::SaleInvoice
        );
        assert_eq!(
            InvoiceFlavor::Sale.settlement_kind(),
            TransactionKind::Collection
        );
        assert_eq!(InvoiceFlavor::Sale.stock_kind(), TransactionKind::Sale);

        assert_eq!(
            InvoiceFlavor::Purchase.settlement_kind(),
            TransactionKind::Payment
        );
        assert_eq!(
            InvoiceFlavor::SaleReturn.settlement_kind(),
            TransactionKind::Payment
        );
        assert_eq!(
            InvoiceFlavor::PurchaseReturn.settlement_kind(),
            TransactionKind::Collection
        );
    }

    #[test]
    fn test_invoice_flavor_contact_roles() {
        assert_eq!(InvoiceFlavor::Sale.contact_role(), ContactRole::Customer);
        assert_eq!(
            InvoiceFlavor::SaleReturn.contact_role(),
            ContactRole::Customer
        );
        assert_eq!(
            InvoiceFlavor::Purchase.contact_role(),
            ContactRole::Supplier
        );
        assert_eq!(
            InvoiceFlavor::PurchaseReturn.contact_role(),
            ContactRole::Supplier
        );
    }

    #[test]
    fn test_permit_direction_kinds() {
        assert_eq!(PermitDirection::Issue.stock_kind(), TransactionKind::Sale);
        assert_eq!(
            PermitDirection::Receive.stock_kind(),
            TransactionKind::Purchase
        );
    }

    #[test]
    fn test_auto_post_defaults() {
        let permit = DocumentDetails::StockPermit(StockPermitDetails {
            direction: PermitDirection::Issue,
            person: "warehouse".to_string(),
            lines: Vec::new(),
        });
        assert!(!permit.auto_posts());

        let deposit = DocumentDetails::SafeDeposit(SafeMovementDetails {
            amount: dec!(10),
            safe_id: AccountId::new(),
            counterparty: "owner".to_string(),
        });
        assert!(deposit.auto_posts());
    }

    #[test]
    fn test_owned_transactions_roundtrip() {
        let mut owned = OwnedTransactions::default();
        assert!(owned.is_empty());

        owned.contact = Some(TransactionId::new());
        owned.stock.push(TransactionId::new());
        owned.stock.push(TransactionId::new());
        assert_eq!(owned.all().len(), 3);

        owned.clear();
        assert!(owned.is_empty());
    }
}
