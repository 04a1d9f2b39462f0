//! The document rules table.
//!
//! A static lookup from `(account kind, transaction kind)` to the signed
//! effect on the account's balance. Recalculation applies the effect to the
//! magnitude of the stored amount; the table alone decides direction.

use rust_decimal::Decimal;

use super::account::{AccountKind, ContactRole};
use super::transaction::TransactionKind;

/// Signed effect of a transaction kind on an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Adds the amount's magnitude to the balance.
    Increase,
    /// Subtracts the amount's magnitude from the balance.
    Decrease,
    /// Leaves the balance untouched.
    NoOp,
}

impl Effect {
    /// Applies this effect to a running balance.
    #[must_use]
    pub fn apply(self, balance: Decimal, amount: Decimal) -> Decimal {
        match self {
            Self::Increase => balance + amount.abs(),
            Self::Decrease => balance - amount.abs(),
            Self::NoOp => balance,
        }
    }
}

/// Looks up the effect of a transaction kind on an account of the given kind.
///
/// Kinds that do not belong to the account's ledger at all are rejected
/// earlier, at append time; here they fall through to `NoOp` so replay of
/// historic rows can never panic.
#[must_use]
pub fn effect_of(account: AccountKind, kind: TransactionKind) -> Effect {
    use TransactionKind as K;

    match account {
        AccountKind::Safe => match kind {
            K::SaleInvoice | K::PurchaseReturnInvoice | K::Collection | K::Deposit | K::Income => {
                Effect::Increase
            }
            K::PurchaseInvoice
            | K::SaleReturnInvoice
            | K::Payment
            | K::Withdrawal
            | K::Expense => Effect::Decrease,
            _ => Effect::NoOp,
        },
        // A collection is cash in, a payment cash out. Cash out to a
        // customer (a refund) raises what they owe; cash in from a
        // supplier raises what we owe them.
        AccountKind::Contact(ContactRole::Customer) => match kind {
            K::SaleInvoice | K::Payment => Effect::Increase,
            K::SaleReturnInvoice | K::Collection => Effect::Decrease,
            _ => Effect::NoOp,
        },
        AccountKind::Contact(ContactRole::Supplier) => match kind {
            K::PurchaseInvoice | K::Collection => Effect::Increase,
            K::PurchaseReturnInvoice | K::Payment => Effect::Decrease,
            _ => Effect::NoOp,
        },
        AccountKind::Product => match kind {
            K::Purchase | K::SaleReturn | K::Adjustment => Effect::Increase,
            K::Sale | K::PurchaseReturn => Effect::Decrease,
            _ => Effect::NoOp,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(TransactionKind::SaleInvoice, Effect::Increase)]
    #[case(TransactionKind::PurchaseInvoice, Effect::Decrease)]
    #[case(TransactionKind::SaleReturnInvoice, Effect::Decrease)]
    #[case(TransactionKind::PurchaseReturnInvoice, Effect::Increase)]
    #[case(TransactionKind::Collection, Effect::Increase)]
    #[case(TransactionKind::Payment, Effect::Decrease)]
    #[case(TransactionKind::Deposit, Effect::Increase)]
    #[case(TransactionKind::Withdrawal, Effect::Decrease)]
    #[case(TransactionKind::Expense, Effect::Decrease)]
    #[case(TransactionKind::Income, Effect::Increase)]
    fn test_safe_effects(#[case] kind: TransactionKind, #[case] expected: Effect) {
        assert_eq!(effect_of(AccountKind::Safe, kind), expected);
    }

    #[rstest]
    #[case(TransactionKind::SaleInvoice, Effect::Increase)]
    #[case(TransactionKind::SaleReturnInvoice, Effect::Decrease)]
    #[case(TransactionKind::Collection, Effect::Decrease)]
    #[case(TransactionKind::Payment, Effect::Increase)]
    #[case(TransactionKind::PurchaseInvoice, Effect::NoOp)]
    #[case(TransactionKind::PurchaseReturnInvoice, Effect::NoOp)]
    fn test_customer_effects(#[case] kind: TransactionKind, #[case] expected: Effect) {
        assert_eq!(
            effect_of(AccountKind::Contact(ContactRole::Customer), kind),
            expected
        );
    }

    #[rstest]
    #[case(TransactionKind::PurchaseInvoice, Effect::Increase)]
    #[case(TransactionKind::PurchaseReturnInvoice, Effect::Decrease)]
    #[case(TransactionKind::Payment, Effect::Decrease)]
    #[case(TransactionKind::Collection, Effect::Increase)]
    #[case(TransactionKind::SaleInvoice, Effect::NoOp)]
    #[case(TransactionKind::SaleReturnInvoice, Effect::NoOp)]
    fn test_supplier_effects(#[case] kind: TransactionKind, #[case] expected: Effect) {
        assert_eq!(
            effect_of(AccountKind::Contact(ContactRole::Supplier), kind),
            expected
        );
    }

    #[rstest]
    #[case(TransactionKind::Sale, Effect::Decrease)]
    #[case(TransactionKind::Purchase, Effect::Increase)]
    #[case(TransactionKind::SaleReturn, Effect::Increase)]
    #[case(TransactionKind::PurchaseReturn, Effect::Decrease)]
    #[case(TransactionKind::Adjustment, Effect::Increase)]
    fn test_product_effects(#[case] kind: TransactionKind, #[case] expected: Effect) {
        assert_eq!(effect_of(AccountKind::Product, kind), expected);
    }

    #[test]
    fn test_effect_uses_magnitude() {
        // Settlement rows store a negated amount; the table decides direction.
        assert_eq!(Effect::Decrease.apply(dec!(500), dec!(-200)), dec!(300));
        assert_eq!(Effect::Increase.apply(dec!(100), dec!(-50)), dec!(150));
        assert_eq!(Effect::NoOp.apply(dec!(100), dec!(-50)), dec!(100));
    }
}
