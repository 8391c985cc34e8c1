//! Error types for hashdash storage.

use hashdash_core::StatsError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: &'static str,
        /// The identifier looked up.
        id: String,
    },

    /// Record already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// The kind of record.
        entity: &'static str,
        /// The conflicting identifier.
        id: String,
    },

    /// The referred account is already attributed to a referrer.
    #[error("account already referred: {referred_id}")]
    DuplicateReferral {
        /// The referred account.
        referred_id: String,
    },

    /// A stats update would violate the non-negativity invariant.
    #[error(transparent)]
    InvalidStats(#[from] StatsError),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn poisoned<T>(_: std::sync::PoisonError<T>) -> Self {
        Self::Database("store lock poisoned".into())
    }
}
