//! Change notification hub.
//!
//! Maps `(change type, normalized uri)` keys to observer callbacks.
//! Delivery is asynchronous relative to the mutating call: `notify`
//! snapshots the subscriber list, schedules a task that invokes the
//! callbacks in registration order, and returns immediately. Every callback
//! registered at notify time is invoked exactly once per notify.

use datashare_types::{ChangeNotification, ChangeType};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Observer callback invoked on change delivery.
pub type ChangeCallback = Arc<dyn Fn(ChangeNotification) + Send + Sync>;

/// Process-wide subscription registry with async fan-out.
#[derive(Default)]
pub struct ChangeHub {
    subscriptions: RwLock<HashMap<(ChangeType, String), Vec<ChangeCallback>>>,
}

impl ChangeHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for `(change_type, uri)`.
    ///
    /// Registering the identical callback (same `Arc`) twice is idempotent:
    /// at most one delivery per notify, not one per duplicate registration.
    pub async fn subscribe(&self, change_type: ChangeType, uri: &str, callback: ChangeCallback) {
        let key = (change_type, uri.to_string());
        let mut table = self.subscriptions.write().await;
        let callbacks = table.entry(key).or_default();
        if callbacks.iter().any(|cb| Arc::ptr_eq(cb, &callback)) {
            debug!(%change_type, uri, "duplicate subscription ignored");
            return;
        }
        callbacks.push(callback);
        debug!(%change_type, uri, count = callbacks.len(), "observer subscribed");
    }

    /// Removes a callback, or every callback for the key when `callback` is
    /// `None`. Unsubscribing something absent is a silent no-op.
    pub async fn unsubscribe(
        &self,
        change_type: ChangeType,
        uri: &str,
        callback: Option<&ChangeCallback>,
    ) {
        let key = (change_type, uri.to_string());
        let mut table = self.subscriptions.write().await;
        match callback {
            None => {
                table.remove(&key);
                debug!(%change_type, uri, "all observers unsubscribed");
            }
            Some(target) => {
                if let Some(callbacks) = table.get_mut(&key) {
                    callbacks.retain(|cb| !Arc::ptr_eq(cb, target));
                    if callbacks.is_empty() {
                        table.remove(&key);
                    }
                }
            }
        }
    }

    /// Returns how many observers are registered for the key.
    pub async fn observer_count(&self, change_type: ChangeType, uri: &str) -> usize {
        self.subscriptions
            .read()
            .await
            .get(&(change_type, uri.to_string()))
            .map_or(0, Vec::len)
    }

    /// Fans a change out to the key's observers.
    ///
    /// Fire-and-forget: the subscriber list is snapshotted, delivery runs on
    /// a spawned task in registration order, and the call returns the number
    /// of observers scheduled without waiting for them.
    pub async fn notify(&self, change_type: ChangeType, uri: &str) -> usize {
        let snapshot: Vec<ChangeCallback> = self
            .subscriptions
            .read()
            .await
            .get(&(change_type, uri.to_string()))
            .cloned()
            .unwrap_or_default();

        let scheduled = snapshot.len();
        if scheduled == 0 {
            return 0;
        }

        let notification = ChangeNotification::new(change_type, uri);
        debug!(%change_type, uri, scheduled, "dispatching change notification");
        tokio::spawn(async move {
            for callback in snapshot {
                callback(notification.clone());
            }
        });
        scheduled
    }
}
