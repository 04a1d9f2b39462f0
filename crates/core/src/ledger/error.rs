//! Ledger error types.

use meezan_shared::types::{AccountId, TransactionId, UnitId};
use thiserror::Error;

use super::transaction::{LedgerKind, TransactionKind};

/// Errors that can occur in the ledger store.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Product unit not found.
    #[error("Product unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The transaction kind does not belong to the account's ledger.
    #[error("Transaction kind {kind:?} does not apply to the {ledger} ledger")]
    KindMismatch {
        /// The ledger of the target account.
        ledger: LedgerKind,
        /// The rejected transaction kind.
        kind: TransactionKind,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::UnitNotFound(_) => "UNIT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::new()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::TransactionNotFound(TransactionId::new()).error_code(),
            "TRANSACTION_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::KindMismatch {
                ledger: LedgerKind::Stock,
                kind: TransactionKind::Deposit,
            }
            .error_code(),
            "KIND_MISMATCH"
        );
    }

    #[test]
    fn test_kind_mismatch_display() {
        let err = LedgerError::KindMismatch {
            ledger: LedgerKind::Counterparty,
            kind: TransactionKind::Adjustment,
        };
        assert_eq!(
            err.to_string(),
            "Transaction kind Adjustment does not apply to the counterparty ledger"
        );
    }
}
