//! Core type definitions for the data-share broker.
//!
//! This crate defines the fundamental, provider-agnostic types used
//! throughout the broker:
//! - Resource URIs with normalization and proxy detection
//! - Caller and session identifiers (UUID v7)
//! - Typed, insertion-ordered value buckets for write payloads
//! - Composable predicates for read/update/delete targeting
//! - Change notification descriptors
//!
//! All provider-specific behavior (table layout, predicate evaluation,
//! MIME types) belongs in the provider crates, not here.

mod change;
mod ids;
mod predicate;
mod uri;
mod value;

pub use change::{ChangeNotification, ChangeType};
pub use ids::{CallerId, SessionId};
pub use predicate::{OperationItem, PredicateOperator, Predicates};
pub use uri::ResourceUri;
pub use value::{Value, ValuesBucket};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
