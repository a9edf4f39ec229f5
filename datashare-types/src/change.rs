//! Change notification descriptors.
//!
//! Observers subscribe to a `(ChangeType, uri)` key; the notification hub
//! delivers a [`ChangeNotification`] to each registered callback when the
//! matching resource mutates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of change an observer subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeType {
    /// Any data mutation under the subscribed URI.
    DataChange,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataChange => write!(f, "dataChange"),
        }
    }
}

/// Payload delivered to change observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub change_type: ChangeType,
    /// Normalized URI of the mutated resource.
    pub uri: String,
}

impl ChangeNotification {
    /// Creates a notification for a normalized URI.
    #[must_use]
    pub fn new(change_type: ChangeType, uri: impl Into<String>) -> Self {
        Self {
            change_type,
            uri: uri.into(),
        }
    }
}
