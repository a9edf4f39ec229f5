//! Error taxonomy for the broker.
//!
//! Every broker call returns either a value or one of these structured
//! errors; no provider fault is allowed to cross the session boundary raw.
//! Each variant carries a stable numeric code so bindings can surface a
//! `{code, message}` pair.

use crate::provider::ProviderFailure;
use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors that can occur in broker operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// A null/empty/malformed argument was rejected before any provider
    /// contact.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The URI could not be parsed.
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// No registered provider matches the URI's authority.
    #[error("unknown authority: {0}")]
    UnknownAuthority(String),

    /// A normalized URI could not be mapped back to its original form.
    #[error("resolution failed: {0}")]
    Resolution(String),

    /// The session was disconnected before the operation started.
    #[error("session not connected")]
    NotConnected,

    /// The gate rejected the caller outright.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// Silent proxy access is registered but currently disabled.
    #[error("silent proxy disabled for {uri}")]
    ProxyDisabled { uri: String },

    /// Opaque failure surfaced from the backing provider.
    #[error("provider error {code}: {message}")]
    Provider { code: i32, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Numeric codes, `datashare` errno style: 0 is success, broker-detected
/// errors sit above a fixed base. Provider errors pass their own code
/// through untouched.
const CODE_BASE: i32 = 1000;

impl BrokerError {
    /// Returns the stable numeric code for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => CODE_BASE + 1,
            Self::InvalidUri(_) => CODE_BASE + 2,
            Self::UnknownAuthority(_) => CODE_BASE + 3,
            Self::Resolution(_) => CODE_BASE + 4,
            Self::NotConnected => CODE_BASE + 5,
            Self::PermissionDenied { .. } => CODE_BASE + 6,
            Self::ProxyDisabled { .. } => CODE_BASE + 7,
            Self::Serialization(_) => CODE_BASE + 8,
            Self::Provider { code, .. } => *code,
        }
    }
}

impl From<datashare_types::Error> for BrokerError {
    fn from(err: datashare_types::Error) -> Self {
        match err {
            datashare_types::Error::InvalidUri(msg) => Self::InvalidUri(msg),
            datashare_types::Error::Serialization(e) => Self::Serialization(e),
            datashare_types::Error::InvalidUuid(e) => Self::InvalidArgument(e.to_string()),
        }
    }
}

impl From<ProviderFailure> for BrokerError {
    fn from(failure: ProviderFailure) -> Self {
        Self::Provider {
            code: failure.code,
            message: failure.message,
        }
    }
}
