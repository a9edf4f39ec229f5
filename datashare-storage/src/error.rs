//! Error types for the in-memory storage provider.

use datashare_broker::ProviderFailure;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Numeric code base for storage provider failures, kept disjoint from the
/// broker's own code range.
const CODE_BASE: i32 = 2000;

/// Errors that can occur in storage operations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The URI carries no table segment.
    #[error("empty table name")]
    EmptyTableName,

    /// The named table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A write was attempted on a read-only table.
    #[error("table is read-only: {0}")]
    ReadOnly(String),

    /// A values bucket failed validation.
    #[error("invalid values bucket: {0}")]
    InvalidBucket(String),

    /// A predicate operation could not be evaluated.
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),
}

impl StorageError {
    /// Returns the stable numeric code for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::EmptyTableName => CODE_BASE + 1,
            Self::TableNotFound(_) => CODE_BASE + 2,
            Self::ReadOnly(_) => CODE_BASE + 3,
            Self::InvalidBucket(_) => CODE_BASE + 4,
            Self::InvalidPredicate(_) => CODE_BASE + 5,
        }
    }
}

impl From<StorageError> for ProviderFailure {
    fn from(err: StorageError) -> Self {
        ProviderFailure::new(err.code(), err.to_string())
    }
}
