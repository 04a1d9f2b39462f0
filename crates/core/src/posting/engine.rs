//! The document posting state machine.
//!
//! Every document is either unposted or posted; `post` materializes its
//! ledger effect as transactions, `unpost` removes them and restores the
//! prior balances. Each top-level operation runs inside one atomic
//! boundary: the book is snapshotted up front and restored wholesale on
//! any failure, so a document is never left half-posted.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use meezan_shared::types::{AccountId, DocumentId, UnitId, round_money};
use meezan_shared::{DuplicateItemHandling, SystemSettings};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::PostingError;
use super::plan::{ExpectedCounts, Slot, build_plan};
use crate::document::totals::{calculate_invoice, calculate_salary};
use crate::document::types::{
    Document, DocumentDetails, DocumentDraft, InvoiceDetails, InvoiceFlavor, InvoiceLine,
    OwnedTransactions, PaymentDirection, PermitLine, StockPermitDetails,
};
use crate::ledger::{
    AccountKind, ContactRole, LedgerAccount, LedgerKind, LedgerStore, LedgerTransaction,
    ProductUnit,
};

/// The engine's entire mutable state: the three ledgers plus the
/// document rows. Cloning it snapshots everything.
#[derive(Debug, Clone, Default)]
struct Book {
    store: LedgerStore,
    documents: HashMap<DocumentId, Document>,
}

impl Book {
    fn document(&self, id: DocumentId) -> Result<&Document, PostingError> {
        self.documents
            .get(&id)
            .ok_or(PostingError::DocumentNotFound(id))
    }

    fn document_mut(&mut self, id: DocumentId) -> Result<&mut Document, PostingError> {
        self.documents
            .get_mut(&id)
            .ok_or(PostingError::DocumentNotFound(id))
    }
}

/// The ledger posting and balance recalculation engine.
///
/// All mutations and reads serialize through one lock over the book, a
/// strict superset of per-account serialization. This is a deliberate
/// strengthening: concurrent posts against the same account must never
/// race the read-modify-write of its cached balance.
#[derive(Debug)]
pub struct PostingEngine {
    book: Mutex<Book>,
    settings: SystemSettings,
}

impl Default for PostingEngine {
    fn default() -> Self {
        Self::new(SystemSettings::default())
    }
}

impl PostingEngine {
    /// Creates an engine with the given system settings.
    #[must_use]
    pub fn new(settings: SystemSettings) -> Self {
        Self {
            book: Mutex::new(Book::default()),
            settings,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Book> {
        // A poisoned lock only means another thread panicked mid-read;
        // the book itself is restored by the snapshot discipline.
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one mutation inside an atomic boundary: snapshot, apply,
    /// restore on failure.
    fn mutate<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Book, &SystemSettings) -> Result<T, PostingError>,
    ) -> Result<T, PostingError> {
        let mut book = self.lock();
        let snapshot = book.clone();

        match f(&mut book, &self.settings) {
            Ok(value) => Ok(value),
            Err(error) => {
                *book = snapshot;
                warn!(operation, error = %error, "Operation failed, book rolled back");
                Err(error)
            }
        }
    }

    // ========== Master-data intake ==========

    /// Registers a ledger account and returns its ID.
    pub fn create_account(
        &self,
        name: impl Into<String>,
        kind: AccountKind,
        initial_balance: Decimal,
    ) -> AccountId {
        let account = LedgerAccount::new(name, kind, initial_balance);
        let id = account.id;
        self.lock().store.insert_account(account);
        id
    }

    /// Registers a unit of measure for a product account.
    pub fn create_unit(
        &self,
        product_id: AccountId,
        name: impl Into<String>,
        conversion_factor: Decimal,
        purchase_price: Decimal,
        sale_price: Decimal,
    ) -> Result<UnitId, PostingError> {
        let mut book = self.lock();
        let account = book.store.account(product_id)?;
        if account.kind != AccountKind::Product {
            return Err(PostingError::Validation(format!(
                "account {product_id} is not a product"
            )));
        }
        if conversion_factor <= Decimal::ZERO {
            return Err(PostingError::Validation(
                "unit conversion factor must be positive".to_string(),
            ));
        }

        let unit = ProductUnit::new(product_id, name, conversion_factor, purchase_price, sale_price);
        let id = unit.id;
        book.store.insert_unit(unit);
        Ok(id)
    }

    // ========== Document lifecycle ==========

    /// Creates a document from a draft.
    ///
    /// Derived totals are recomputed from the authored fields. Kinds that
    /// auto-post do so inside the same atomic boundary: if posting fails,
    /// the document is not retained either.
    pub fn create_document(&self, draft: DocumentDraft) -> Result<DocumentId, PostingError> {
        self.mutate("create_document", |book, settings| {
            let details = prepare_details(book, settings, draft.details)?;
            let auto_post = details.auto_posts();

            let document = Document {
                id: DocumentId::new(),
                number: draft.number,
                date: draft.date,
                reference: draft.reference,
                notes: draft.notes,
                is_posted: false,
                details,
                owned: OwnedTransactions::default(),
            };
            let id = document.id;

            debug!(document_id = %id, kind = document.details.kind_name(), "Document created");
            book.documents.insert(id, document);

            if auto_post {
                post_document(book, settings, id)?;
            }

            Ok(id)
        })
    }

    /// Posts a document, materializing its ledger effect.
    pub fn post(&self, id: DocumentId) -> Result<(), PostingError> {
        self.mutate("post", |book, settings| post_document(book, settings, id))
    }

    /// Unposts a document, removing its ledger effect and restoring the
    /// touched accounts.
    pub fn unpost(&self, id: DocumentId) -> Result<(), PostingError> {
        self.mutate("unpost", |book, _| unpost_document(book, id))
    }

    /// Edits a document. A posted document is unposted, rewritten, and
    /// posted again, all inside one atomic boundary.
    pub fn update_document(
        &self,
        id: DocumentId,
        draft: DocumentDraft,
    ) -> Result<(), PostingError> {
        self.mutate("update_document", |book, settings| {
            let was_posted = book.document(id)?.is_posted;
            if was_posted {
                unpost_document(book, id)?;
            }

            let details = prepare_details(book, settings, draft.details)?;
            let document = book.document_mut(id)?;
            document.number = draft.number;
            document.date = draft.date;
            document.reference = draft.reference;
            document.notes = draft.notes;
            document.details = details;

            if was_posted {
                post_document(book, settings, id)?;
            }

            Ok(())
        })
    }

    /// Deletes a document, unposting it first when necessary.
    pub fn delete_document(&self, id: DocumentId) -> Result<(), PostingError> {
        self.mutate("delete_document", |book, _| {
            if book.document(id)?.is_posted {
                unpost_document(book, id)?;
            }
            book.documents.remove(&id);
            debug!(document_id = %id, "Document deleted");
            Ok(())
        })
    }

    // ========== Reads ==========

    /// Returns an account's transactions in chronological order, with
    /// the stored before/after balances verbatim.
    pub fn ledger_history(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<LedgerTransaction>, PostingError> {
        Ok(self.lock().store.transactions_for(account_id)?)
    }

    /// Returns an account's cached closing balance.
    pub fn current_balance(&self, account_id: AccountId) -> Result<Decimal, PostingError> {
        Ok(self.lock().store.current_balance(account_id)?)
    }

    /// Returns a product unit.
    pub fn unit(&self, id: UnitId) -> Result<ProductUnit, PostingError> {
        Ok(self.lock().store.unit(id)?.clone())
    }

    /// Returns a document.
    pub fn document(&self, id: DocumentId) -> Result<Document, PostingError> {
        Ok(self.lock().document(id)?.clone())
    }
}

// ========== Posting internals ==========

/// Posts one document inside the caller's atomic boundary.
fn post_document(
    book: &mut Book,
    settings: &SystemSettings,
    id: DocumentId,
) -> Result<(), PostingError> {
    let document = book.document(id)?;
    if document.is_posted {
        return Err(PostingError::AlreadyPosted);
    }
    let document = document.clone();

    let plan = build_plan(&document, &book.store)?;
    let mut owned = OwnedTransactions::default();
    let mut created = ExpectedCounts {
        counterparty: 0,
        cash: 0,
        stock: 0,
    };

    for planned in plan {
        let account_ledger = book.store.account(planned.input.account_id)?.kind.ledger();
        let transaction_id = book.store.append_transaction(planned.input)?;

        match planned.slot {
            Slot::Contact => owned.contact = Some(transaction_id),
            Slot::Settlement => owned.settlement = Some(transaction_id),
            Slot::Safe => owned.safe = Some(transaction_id),
            Slot::Stock => owned.stock.push(transaction_id),
        }
        match account_ledger {
            LedgerKind::Counterparty => created.counterparty += 1,
            LedgerKind::Cash => created.cash += 1,
            LedgerKind::Stock => created.stock += 1,
        }
    }

    verify_complete(&document.details, created)?;
    apply_post_side_effects(book, settings, &document)?;

    let document = book.document_mut(id)?;
    document.owned = owned;
    document.is_posted = true;

    info!(document_id = %id, kind = document.details.kind_name(), "Document posted");
    Ok(())
}

/// Compares the created per-ledger row counts with what the document
/// rules require; any shortfall aborts the boundary.
fn verify_complete(
    details: &DocumentDetails,
    created: ExpectedCounts,
) -> Result<(), PostingError> {
    let expected = ExpectedCounts::of(details);

    let checks = [
        (LedgerKind::Counterparty, expected.counterparty, created.counterparty),
        (LedgerKind::Cash, expected.cash, created.cash),
        (LedgerKind::Stock, expected.stock, created.stock),
    ];
    for (ledger, expected, actual) in checks {
        if expected != actual {
            return Err(PostingError::PostingIncomplete {
                ledger,
                expected,
                actual,
            });
        }
    }

    Ok(())
}

/// Kind-specific side effects applied after the ledger rows exist.
fn apply_post_side_effects(
    book: &mut Book,
    settings: &SystemSettings,
    document: &Document,
) -> Result<(), PostingError> {
    match &document.details {
        DocumentDetails::Invoice(invoice) => update_unit_prices(book, settings, invoice),
        DocumentDetails::Payment(payment) => {
            if let Some(invoice_id) = payment.invoice_id {
                adjust_settled_invoice(book, invoice_id, payment.direction, payment.amount)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Updates unit list prices from a posted invoice's lines, gated by the
/// system settings switches.
fn update_unit_prices(
    book: &mut Book,
    settings: &SystemSettings,
    invoice: &InvoiceDetails,
) -> Result<(), PostingError> {
    match invoice.flavor {
        InvoiceFlavor::Purchase if settings.update_purchase_price => {
            for line in &invoice.lines {
                let unit = book.store.unit_mut(line.unit_id)?;
                unit.purchase_price = line.unit_price;
            }
        }
        InvoiceFlavor::Sale if settings.update_sale_price => {
            for line in &invoice.lines {
                let unit = book.store.unit_mut(line.unit_id)?;
                unit.sale_price = line.unit_price;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Moves a linked invoice's paid/remaining amounts by `delta` when the
/// payment direction matches the invoice flavor (receipts settle sale
/// invoices, disbursements settle purchase invoices).
fn adjust_settled_invoice(
    book: &mut Book,
    invoice_id: DocumentId,
    direction: PaymentDirection,
    delta: Decimal,
) -> Result<(), PostingError> {
    let target = book.document_mut(invoice_id)?;
    let DocumentDetails::Invoice(invoice) = &mut target.details else {
        return Err(PostingError::Validation(
            "linked document is not an invoice".to_string(),
        ));
    };

    let settles = matches!(
        (direction, invoice.flavor),
        (PaymentDirection::Receipt, InvoiceFlavor::Sale)
            | (PaymentDirection::Disbursement, InvoiceFlavor::Purchase)
    );
    if settles {
        invoice.paid_amount += delta;
        invoice.remaining_amount = invoice.net_amount - invoice.paid_amount;
    }

    Ok(())
}

/// Unposts one document inside the caller's atomic boundary.
fn unpost_document(book: &mut Book, id: DocumentId) -> Result<(), PostingError> {
    let document = book.document(id)?;
    if !document.is_posted {
        return Err(PostingError::NotPosted);
    }
    let document = document.clone();

    // Each removal replays the touched account before the next one runs.
    for transaction_id in document.owned.all() {
        book.store.remove_transaction(transaction_id)?;
    }

    if let DocumentDetails::Payment(payment) = &document.details {
        if let Some(invoice_id) = payment.invoice_id {
            adjust_settled_invoice(book, invoice_id, payment.direction, -payment.amount)?;
        }
    }

    let document = book.document_mut(id)?;
    document.owned.clear();
    document.is_posted = false;

    info!(document_id = %id, kind = document.details.kind_name(), "Document unposted");
    Ok(())
}

// ========== Intake validation ==========

/// Validates a draft's details and recomputes its derived fields.
fn prepare_details(
    book: &Book,
    settings: &SystemSettings,
    details: DocumentDetails,
) -> Result<DocumentDetails, PostingError> {
    match details {
        DocumentDetails::Invoice(mut invoice) => {
            expect_contact_role(book, invoice.contact_id, invoice.flavor.contact_role())?;
            if let Some(safe_id) = invoice.safe_id {
                expect_kind(book, safe_id, expect_safe, "safe")?;
            }
            if settings.duplicate_item_handling == DuplicateItemHandling::IncreaseQuantity {
                merge_duplicate_invoice_lines(&mut invoice);
            }
            for line in &invoice.lines {
                expect_kind(book, line.product_id, expect_product, "product")?;
                validate_line_unit(book, line.product_id, line.unit_id)?;
                require_positive(line.quantity, "line quantity")?;
                if line.unit_price < Decimal::ZERO {
                    return Err(PostingError::Validation(
                        "unit price must not be negative".to_string(),
                    ));
                }
                validate_percentage(line.discount_percentage, "discount percentage")?;
                validate_percentage(line.tax_percentage, "tax percentage")?;
            }
            if invoice.paid_amount < Decimal::ZERO {
                return Err(PostingError::Validation(
                    "paid amount must not be negative".to_string(),
                ));
            }
            invoice.paid_amount = round_money(invoice.paid_amount);
            calculate_invoice(&mut invoice);
            Ok(DocumentDetails::Invoice(invoice))
        }
        DocumentDetails::Payment(mut payment) => {
            expect_kind(book, payment.contact_id, expect_contact, "contact")?;
            expect_kind(book, payment.safe_id, expect_safe, "safe")?;
            require_positive(payment.amount, "payment amount")?;
            if let Some(invoice_id) = payment.invoice_id {
                let target = book.document(invoice_id)?;
                if !matches!(target.details, DocumentDetails::Invoice(_)) {
                    return Err(PostingError::Validation(
                        "linked document is not an invoice".to_string(),
                    ));
                }
            }
            payment.amount = round_money(payment.amount);
            Ok(DocumentDetails::Payment(payment))
        }
        DocumentDetails::Expense(mut voucher) => {
            expect_kind(book, voucher.safe_id, expect_safe, "safe")?;
            require_positive(voucher.amount, "expense amount")?;
            voucher.amount = round_money(voucher.amount);
            Ok(DocumentDetails::Expense(voucher))
        }
        DocumentDetails::Income(mut voucher) => {
            expect_kind(book, voucher.safe_id, expect_safe, "safe")?;
            require_positive(voucher.amount, "income amount")?;
            voucher.amount = round_money(voucher.amount);
            Ok(DocumentDetails::Income(voucher))
        }
        DocumentDetails::SafeDeposit(mut movement) => {
            expect_kind(book, movement.safe_id, expect_safe, "safe")?;
            require_positive(movement.amount, "deposit amount")?;
            movement.amount = round_money(movement.amount);
            Ok(DocumentDetails::SafeDeposit(movement))
        }
        DocumentDetails::SafeWithdrawal(mut movement) => {
            expect_kind(book, movement.safe_id, expect_safe, "safe")?;
            require_positive(movement.amount, "withdrawal amount")?;
            movement.amount = round_money(movement.amount);
            Ok(DocumentDetails::SafeWithdrawal(movement))
        }
        DocumentDetails::StockPermit(mut permit) => {
            if settings.duplicate_item_handling == DuplicateItemHandling::IncreaseQuantity {
                merge_duplicate_permit_lines(&mut permit);
            }
            for line in &permit.lines {
                expect_kind(book, line.product_id, expect_product, "product")?;
                validate_line_unit(book, line.product_id, line.unit_id)?;
                require_positive(line.quantity, "line quantity")?;
            }
            Ok(DocumentDetails::StockPermit(permit))
        }
        DocumentDetails::EmployeeLoan(mut loan) => {
            expect_kind(book, loan.safe_id, expect_safe, "safe")?;
            require_positive(loan.amount, "loan amount")?;
            loan.amount = round_money(loan.amount);
            Ok(DocumentDetails::EmployeeLoan(loan))
        }
        DocumentDetails::EmployeeSalary(mut salary) => {
            expect_kind(book, salary.safe_id, expect_safe, "safe")?;
            calculate_salary(&mut salary);
            require_positive(salary.net_salary, "net salary")?;
            salary.net_salary = round_money(salary.net_salary);
            Ok(DocumentDetails::EmployeeSalary(salary))
        }
    }
}

fn require_positive(amount: Decimal, what: &str) -> Result<(), PostingError> {
    if amount <= Decimal::ZERO {
        return Err(PostingError::Validation(format!(
            "{what} must be positive"
        )));
    }
    Ok(())
}

fn validate_percentage(rate: Decimal, what: &str) -> Result<(), PostingError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(PostingError::Validation(format!(
            "{what} must be between 0 and 100"
        )));
    }
    Ok(())
}

fn expect_contact(kind: AccountKind) -> bool {
    matches!(kind, AccountKind::Contact(_))
}

fn expect_safe(kind: AccountKind) -> bool {
    kind == AccountKind::Safe
}

fn expect_product(kind: AccountKind) -> bool {
    kind == AccountKind::Product
}

fn expect_kind(
    book: &Book,
    account_id: AccountId,
    check: fn(AccountKind) -> bool,
    what: &str,
) -> Result<(), PostingError> {
    let account = book.store.account(account_id)?;
    if !check(account.kind) {
        return Err(PostingError::Validation(format!(
            "account {account_id} is not a {what}"
        )));
    }
    Ok(())
}

/// Checks that an invoice's contact matches the role its flavor is
/// written against; a mismatched pair would post rows whose replay
/// effect is a no-op.
fn expect_contact_role(
    book: &Book,
    account_id: AccountId,
    role: ContactRole,
) -> Result<(), PostingError> {
    let account = book.store.account(account_id)?;
    if account.kind != AccountKind::Contact(role) {
        let what = match role {
            ContactRole::Customer => "customer",
            ContactRole::Supplier => "supplier",
        };
        return Err(PostingError::Validation(format!(
            "account {account_id} is not a {what}"
        )));
    }
    Ok(())
}

fn validate_line_unit(
    book: &Book,
    product_id: AccountId,
    unit_id: UnitId,
) -> Result<(), PostingError> {
    let unit = book.store.unit(unit_id)?;
    if unit.product_id != product_id {
        return Err(PostingError::Validation(format!(
            "unit {unit_id} does not belong to product {product_id}"
        )));
    }
    Ok(())
}

/// Merges invoice lines that repeat the same product, unit, and rates by
/// adding their quantities.
fn merge_duplicate_invoice_lines(invoice: &mut InvoiceDetails) {
    let mut merged: Vec<InvoiceLine> = Vec::new();
    for line in invoice.lines.drain(..) {
        if let Some(existing) = merged.iter_mut().find(|l| {
            l.product_id == line.product_id
                && l.unit_id == line.unit_id
                && l.unit_price == line.unit_price
                && l.discount_percentage == line.discount_percentage
                && l.tax_percentage == line.tax_percentage
        }) {
            existing.quantity += line.quantity;
        } else {
            merged.push(line);
        }
    }
    invoice.lines = merged;
}

/// Merges permit lines that repeat the same product and unit.
fn merge_duplicate_permit_lines(permit: &mut StockPermitDetails) {
    let mut merged: Vec<PermitLine> = Vec::new();
    for line in permit.lines.drain(..) {
        if let Some(existing) = merged
            .iter_mut()
            .find(|l| l.product_id == line.product_id && l.unit_id == line.unit_id)
        {
            existing.quantity += line.quantity;
        } else {
            merged.push(line);
        }
    }
    permit.lines = merged;
}
