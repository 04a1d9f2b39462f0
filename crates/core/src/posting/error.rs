//! Posting error types.

use meezan_shared::types::DocumentId;
use thiserror::Error;

use crate::ledger::{LedgerError, LedgerKind};

/// Errors that can occur while posting, unposting, or editing documents.
///
/// Any of these aborts the enclosing atomic boundary; no partial ledger
/// side effects survive a failure.
#[derive(Debug, Error)]
pub enum PostingError {
    /// The document is already posted.
    #[error("Document is already posted")]
    AlreadyPosted,

    /// The document is not posted.
    #[error("Document is not posted")]
    NotPosted,

    /// Posting created fewer ledger rows than the document requires.
    #[error("Posting incomplete on the {ledger} ledger: expected {expected}, created {actual}")]
    PostingIncomplete {
        /// The ledger whose row count came up short.
        ledger: LedgerKind,
        /// Rows the document rules require.
        expected: usize,
        /// Rows actually created.
        actual: usize,
    },

    /// A required account is not selected on the document.
    #[error("Missing required account: {0}")]
    MissingRequiredAccount(&'static str),

    /// The document's field values are invalid.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// An underlying ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyPosted => "ALREADY_POSTED",
            Self::NotPosted => "NOT_POSTED",
            Self::PostingIncomplete { .. } => "POSTING_INCOMPLETE",
            Self::MissingRequiredAccount(_) => "MISSING_REQUIRED_ACCOUNT",
            Self::Validation(_) => "VALIDATION_FAILURE",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::Ledger(inner) => inner.error_code(),
        }
    }
}
