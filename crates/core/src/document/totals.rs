//! Derived document amounts.
//!
//! Line and document totals are recomputed from the authored fields every
//! time a document is created or edited; the stored derived values are
//! never trusted as input.

use meezan_shared::types::round_money;
use rust_decimal::Decimal;

use super::types::{EmployeeSalaryDetails, InvoiceDetails, InvoiceLine, PaymentTerms};

/// Recomputes one line's derived amounts.
///
/// Discount applies to the line total; tax applies to the discounted
/// total. Both are quantized to money precision.
pub fn calculate_line(line: &mut InvoiceLine) {
    let hundred = Decimal::ONE_HUNDRED;

    line.total_price = round_money(line.quantity * line.unit_price);
    line.discount_amount = round_money(line.total_price * line.discount_percentage / hundred);
    line.tax_amount =
        round_money((line.total_price - line.discount_amount) * line.tax_percentage / hundred);
    line.net_price = line.total_price - line.discount_amount + line.tax_amount;
}

/// Recomputes an invoice's derived amounts from its lines.
///
/// Cash terms force the paid amount to the net amount and zero the
/// remainder; credit terms keep the authored paid amount and derive the
/// remainder from it.
pub fn calculate_invoice(details: &mut InvoiceDetails) {
    for line in &mut details.lines {
        calculate_line(line);
    }

    details.total_amount = details.lines.iter().map(|l| l.total_price).sum();
    details.discount_amount = details.lines.iter().map(|l| l.discount_amount).sum();
    details.tax_amount = details.lines.iter().map(|l| l.tax_amount).sum();
    details.net_amount = details.total_amount - details.discount_amount + details.tax_amount;

    match details.terms {
        PaymentTerms::Cash => {
            details.paid_amount = details.net_amount;
            details.remaining_amount = Decimal::ZERO;
        }
        PaymentTerms::Credit => {
            details.remaining_amount = details.net_amount - details.paid_amount;
        }
    }
}

/// Recomputes a salary's net amount.
pub fn calculate_salary(details: &mut EmployeeSalaryDetails) {
    details.net_salary = details.base_salary - details.deductions - details.loans_deduction;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::InvoiceFlavor;
    use meezan_shared::types::{AccountId, UnitId};
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, price: Decimal, discount: Decimal, tax: Decimal) -> InvoiceLine {
        InvoiceLine::new(
            AccountId::new(),
            UnitId::new(),
            quantity,
            price,
            discount,
            tax,
        )
    }

    #[test]
    fn test_line_amounts() {
        let mut l = line(dec!(10), dec!(20), dec!(10), dec!(14));
        calculate_line(&mut l);

        assert_eq!(l.total_price, dec!(200.00));
        assert_eq!(l.discount_amount, dec!(20.00));
        // Tax on the discounted total: 180 * 14% = 25.20
        assert_eq!(l.tax_amount, dec!(25.20));
        assert_eq!(l.net_price, dec!(205.20));
    }

    #[test]
    fn test_line_amounts_no_rates() {
        let mut l = line(dec!(3), dec!(7.50), dec!(0), dec!(0));
        calculate_line(&mut l);

        assert_eq!(l.total_price, dec!(22.50));
        assert_eq!(l.discount_amount, dec!(0.00));
        assert_eq!(l.tax_amount, dec!(0.00));
        assert_eq!(l.net_price, dec!(22.50));
    }

    fn invoice(terms: PaymentTerms, paid: Decimal) -> InvoiceDetails {
        InvoiceDetails {
            flavor: InvoiceFlavor::Sale,
            terms,
            contact_id: AccountId::new(),
            safe_id: None,
            lines: vec![
                line(dec!(2), dec!(100), dec!(0), dec!(0)),
                line(dec!(1), dec!(50), dec!(10), dec!(0)),
            ],
            total_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            paid_amount: paid,
            remaining_amount: Decimal::ZERO,
        }
    }

    #[test]
    fn test_cash_terms_settle_in_full() {
        let mut details = invoice(PaymentTerms::Cash, dec!(0));
        calculate_invoice(&mut details);

        assert_eq!(details.total_amount, dec!(250.00));
        assert_eq!(details.discount_amount, dec!(5.00));
        assert_eq!(details.net_amount, dec!(245.00));
        assert_eq!(details.paid_amount, dec!(245.00));
        assert_eq!(details.remaining_amount, dec!(0));
        assert_eq!(details.settled_amount(), dec!(245.00));
    }

    #[test]
    fn test_credit_terms_keep_partial_payment() {
        let mut details = invoice(PaymentTerms::Credit, dec!(100));
        calculate_invoice(&mut details);

        assert_eq!(details.net_amount, dec!(245.00));
        assert_eq!(details.paid_amount, dec!(100));
        assert_eq!(details.remaining_amount, dec!(145.00));
        assert_eq!(details.settled_amount(), dec!(100));
    }

    #[test]
    fn test_salary_net() {
        let mut details = EmployeeSalaryDetails {
            employee: "A. Hassan".to_string(),
            base_salary: dec!(5000),
            deductions: dec!(250),
            loans_deduction: dec!(500),
            net_salary: Decimal::ZERO,
            safe_id: AccountId::new(),
        };
        calculate_salary(&mut details);
        assert_eq!(details.net_salary, dec!(4250));
    }
}
