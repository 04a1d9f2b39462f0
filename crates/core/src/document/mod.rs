//! Business documents and their derived totals.

pub mod totals;
pub mod types;

pub use totals::{calculate_invoice, calculate_line, calculate_salary};
pub use types::{
    Document, DocumentDetails, DocumentDraft, EmployeeLoanDetails, EmployeeSalaryDetails,
    InvoiceDetails, InvoiceFlavor, InvoiceLine, OwnedTransactions, PaymentDetails,
    PaymentDirection, PaymentTerms, PermitDirection, PermitLine, SafeMovementDetails,
    StockPermitDetails, VoucherDetails,
};
