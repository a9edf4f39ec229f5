//! Permission and silent-proxy gate.
//!
//! Tracks, per `(caller, normalized uri)`, whether silent (implicit,
//! non-interactive) proxy access is enabled. The state machine per key is
//! `Unregistered → Disabled → Enabled`: enabling moves Unregistered or
//! Disabled to Enabled; disabling moves Enabled to Disabled and leaves
//! Unregistered untouched.
//!
//! Tolerant-input contract: enable/disable never fail for empty or
//! malformed URIs — those are logged no-ops. Only the access check itself
//! produces denials.

use crate::error::{BrokerError, BrokerResult};
use chrono::{DateTime, Utc};
use datashare_types::{CallerId, ResourceUri};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Silent-proxy registration state for one `(caller, uri)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    /// No registration exists.
    Unregistered,
    /// A registration exists but is currently disabled.
    Disabled,
    /// Silent proxy access is enabled.
    Enabled,
}

/// What an operation wants to do, for gate diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

#[derive(Debug, Clone)]
struct Registration {
    enabled: bool,
    granted_at: DateTime<Utc>,
}

/// Process-wide silent-proxy registration table.
#[derive(Default)]
pub struct ProxyGate {
    registrations: RwLock<HashMap<(CallerId, String), Registration>>,
}

impl ProxyGate {
    /// Creates an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys registrations by normalized URI so `?query` variants share one
    /// grant. Returns `None` for empty/malformed input (tolerated).
    fn key_for(uri: &str) -> Option<String> {
        if uri.is_empty() {
            return None;
        }
        match ResourceUri::parse(uri) {
            Ok(parsed) => Some(parsed.normalized()),
            Err(e) => {
                warn!(uri, error = %e, "silent proxy request for malformed URI, ignoring");
                None
            }
        }
    }

    /// Enables silent proxy access for `(caller, uri)`.
    ///
    /// Empty or malformed URIs are a no-op success, never an error.
    pub async fn enable_silent_proxy(&self, caller: CallerId, uri: &str) -> BrokerResult<()> {
        let Some(key) = Self::key_for(uri) else {
            debug!(%caller, "enable silent proxy: no-op for empty/malformed URI");
            return Ok(());
        };
        let mut table = self.registrations.write().await;
        let entry = table.entry((caller, key.clone())).or_insert(Registration {
            enabled: false,
            granted_at: Utc::now(),
        });
        entry.enabled = true;
        entry.granted_at = Utc::now();
        debug!(%caller, uri = %key, "silent proxy enabled");
        Ok(())
    }

    /// Disables silent proxy access for `(caller, uri)`.
    ///
    /// Idempotent when already disabled; an unregistered key stays
    /// unregistered. Same tolerant-input contract as enable.
    pub async fn disable_silent_proxy(&self, caller: CallerId, uri: &str) -> BrokerResult<()> {
        let Some(key) = Self::key_for(uri) else {
            debug!(%caller, "disable silent proxy: no-op for empty/malformed URI");
            return Ok(());
        };
        let mut table = self.registrations.write().await;
        if let Some(entry) = table.get_mut(&(caller, key.clone())) {
            entry.enabled = false;
            debug!(%caller, uri = %key, "silent proxy disabled");
        }
        Ok(())
    }

    /// Returns the registration state for `(caller, uri)`.
    pub async fn state(&self, caller: CallerId, uri: &str) -> ProxyState {
        let Some(key) = Self::key_for(uri) else {
            return ProxyState::Unregistered;
        };
        match self.registrations.read().await.get(&(caller, key)) {
            None => ProxyState::Unregistered,
            Some(r) if r.enabled => ProxyState::Enabled,
            Some(_) => ProxyState::Disabled,
        }
    }

    /// Returns when the current grant was issued, if enabled.
    pub async fn granted_at(&self, caller: CallerId, uri: &str) -> Option<DateTime<Utc>> {
        let key = Self::key_for(uri)?;
        self.registrations
            .read()
            .await
            .get(&(caller, key))
            .filter(|r| r.enabled)
            .map(|r| r.granted_at)
    }

    /// Checks whether a proxy-mode operation may proceed.
    ///
    /// Consulted by the dispatcher before every cross-process call when the
    /// session is in proxy mode.
    pub async fn check_access(
        &self,
        caller: CallerId,
        uri: &ResourceUri,
        kind: AccessKind,
    ) -> BrokerResult<()> {
        let key = uri.normalized();
        match self.registrations.read().await.get(&(caller, key.clone())) {
            Some(r) if r.enabled => Ok(()),
            Some(_) => {
                debug!(%caller, uri = %key, ?kind, "access denied: proxy disabled");
                Err(BrokerError::ProxyDisabled { uri: key })
            }
            None => {
                debug!(%caller, uri = %key, ?kind, "access denied: no registration");
                Err(BrokerError::PermissionDenied {
                    reason: format!("no silent proxy registration for {key}"),
                })
            }
        }
    }
}
