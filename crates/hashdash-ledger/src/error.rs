//! Error types for ledger operations.

use hashdash_store::StoreError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The account has no profile or stats row.
    #[error("account not found: {account_id}")]
    AccountNotFound {
        /// The account looked up.
        account_id: String,
    },

    /// The account is already registered.
    #[error("account already exists: {account_id}")]
    AccountExists {
        /// The conflicting account.
        account_id: String,
    },

    /// Caller-supplied input failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub(crate) fn account_not_found(account_id: impl ToString) -> Self {
        Self::AccountNotFound {
            account_id: account_id.to_string(),
        }
    }
}
