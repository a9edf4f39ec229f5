//! Broker facade and per-consumer session handle.
//!
//! A [`Session`] is the single entry point a consumer uses: it owns the
//! proxy-mode flag for its lifetime and a connected flag that every
//! operation checks first. Disconnect flips the flag; operations already
//! dispatched complete, new ones fail fast with
//! [`BrokerError::NotConnected`] — never a hang, never a dereference of a
//! dead binding.

use crate::dispatcher::{Dispatcher, OpContext};
use crate::error::{BrokerError, BrokerResult};
use crate::gate::{ProxyGate, ProxyState};
use crate::hub::{ChangeCallback, ChangeHub};
use crate::provider::{FileHandle, Provider, ResultSet};
use crate::resolver::UriResolver;
use datashare_types::{CallerId, ChangeType, Predicates, ResourceUri, SessionId, ValuesBucket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Options for creating a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// Route every operation through the silent-proxy gate.
    pub is_proxy: bool,
}

/// The process-wide broker: provider registry, gate, hub, and dispatcher.
///
/// Cheap to share; sessions hold `Arc`s into its internals.
pub struct DataShareBroker {
    resolver: Arc<UriResolver>,
    gate: Arc<ProxyGate>,
    hub: Arc<ChangeHub>,
    dispatcher: Arc<Dispatcher>,
}

impl Default for DataShareBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl DataShareBroker {
    /// Creates a broker with no registered providers.
    #[must_use]
    pub fn new() -> Self {
        let resolver = Arc::new(UriResolver::new());
        let gate = Arc::new(ProxyGate::new());
        let hub = Arc::new(ChangeHub::new());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&resolver),
            Arc::clone(&gate),
            Arc::clone(&hub),
        ));
        Self {
            resolver,
            gate,
            hub,
            dispatcher,
        }
    }

    /// Registers a provider under an authority.
    pub async fn register_provider(&self, authority: &str, provider: Arc<dyn Provider>) {
        self.resolver.register_provider(authority, provider).await;
    }

    /// Unregisters the provider for an authority.
    pub async fn unregister_provider(&self, authority: &str) -> bool {
        self.resolver.unregister_provider(authority).await
    }

    /// Enables silent proxy access for `(caller, uri)`. Empty or malformed
    /// URIs are a no-op success.
    pub async fn enable_silent_proxy(&self, caller: CallerId, uri: &str) -> BrokerResult<()> {
        self.gate.enable_silent_proxy(caller, uri).await
    }

    /// Disables silent proxy access for `(caller, uri)`. Idempotent; same
    /// tolerant-input contract as enable.
    pub async fn disable_silent_proxy(&self, caller: CallerId, uri: &str) -> BrokerResult<()> {
        self.gate.disable_silent_proxy(caller, uri).await
    }

    /// Returns the silent-proxy state for `(caller, uri)`.
    pub async fn silent_proxy_state(&self, caller: CallerId, uri: &str) -> ProxyState {
        self.gate.state(caller, uri).await
    }

    /// Creates a session bound to a target URI.
    ///
    /// Fails with [`BrokerError::InvalidUri`] on malformed input and
    /// [`BrokerError::UnknownAuthority`] when no provider answers for the
    /// target — a refused connection, not a half-connected session.
    pub async fn create_helper(
        &self,
        caller: CallerId,
        uri: &str,
        options: CreateOptions,
    ) -> BrokerResult<Session> {
        let target = ResourceUri::parse(uri)?;
        // Resolve now so connection failures surface here.
        let _provider = self.resolver.resolve(&target).await?;

        let is_proxy = options.is_proxy || target.is_proxy();
        let session = Session {
            id: SessionId::new(),
            caller,
            target,
            is_proxy,
            dispatcher: Arc::clone(&self.dispatcher),
            resolver: Arc::clone(&self.resolver),
            hub: Arc::clone(&self.hub),
            connected: AtomicBool::new(true),
        };
        info!(session = %session.id, %caller, uri, is_proxy, "session connected");
        Ok(session)
    }
}

/// Per-consumer connection handle.
///
/// Not thread-shared mutable state beyond the connected flag; sequential
/// operations awaited by one caller complete in issuance order.
pub struct Session {
    id: SessionId,
    caller: CallerId,
    target: ResourceUri,
    is_proxy: bool,
    dispatcher: Arc<Dispatcher>,
    resolver: Arc<UriResolver>,
    hub: Arc<ChangeHub>,
    connected: AtomicBool,
}

impl Session {
    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the caller this session belongs to.
    #[must_use]
    pub fn caller(&self) -> CallerId {
        self.caller
    }

    /// Returns the target URI the session was created for.
    #[must_use]
    pub fn target(&self) -> &ResourceUri {
        &self.target
    }

    /// Returns true when the session routes through the silent-proxy gate.
    #[must_use]
    pub fn is_proxy(&self) -> bool {
        self.is_proxy
    }

    /// Returns true until [`Self::disconnect`] is called.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Disconnects the session. Idempotent. Operations already dispatched
    /// complete; new operations fail fast with
    /// [`BrokerError::NotConnected`].
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!(session = %self.id, "session disconnected");
        }
    }

    fn ensure_connected(&self) -> BrokerResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(BrokerError::NotConnected)
        }
    }

    fn ctx(&self) -> OpContext {
        OpContext {
            caller: self.caller,
            proxy: self.is_proxy,
        }
    }

    /// Inserts one row; returns the new row id.
    pub async fn insert(&self, uri: &str, bucket: &ValuesBucket) -> BrokerResult<i64> {
        self.ensure_connected()?;
        self.dispatcher.insert(self.ctx(), uri, bucket).await
    }

    /// Inserts a batch atomically; returns the number of rows inserted.
    pub async fn batch_insert(&self, uri: &str, buckets: &[ValuesBucket]) -> BrokerResult<i64> {
        self.ensure_connected()?;
        self.dispatcher.batch_insert(self.ctx(), uri, buckets).await
    }

    /// Updates matching rows; returns the affected count.
    pub async fn update(
        &self,
        uri: &str,
        predicates: &Predicates,
        bucket: &ValuesBucket,
    ) -> BrokerResult<i64> {
        self.ensure_connected()?;
        self.dispatcher
            .update(self.ctx(), uri, predicates, bucket)
            .await
    }

    /// Deletes matching rows; returns the affected count.
    pub async fn delete(&self, uri: &str, predicates: &Predicates) -> BrokerResult<i64> {
        self.ensure_connected()?;
        self.dispatcher.delete(self.ctx(), uri, predicates).await
    }

    /// Queries rows; absent predicates mean a full scan.
    pub async fn query(
        &self,
        uri: &str,
        predicates: Option<&Predicates>,
        columns: &[String],
    ) -> BrokerResult<ResultSet> {
        self.ensure_connected()?;
        self.dispatcher
            .query(self.ctx(), uri, predicates, columns)
            .await
    }

    /// Returns the MIME type of data under the URI.
    pub async fn get_type(&self, uri: &str) -> BrokerResult<String> {
        self.ensure_connected()?;
        self.dispatcher.get_type(self.ctx(), uri).await
    }

    /// Returns the MIME types of files matching `mime_filter`.
    pub async fn get_file_types(&self, uri: &str, mime_filter: &str) -> BrokerResult<Vec<String>> {
        self.ensure_connected()?;
        self.dispatcher
            .get_file_types(self.ctx(), uri, mime_filter)
            .await
    }

    /// Opens a file under the URI with a conventional mode string
    /// (`r`, `w`, `wt`, `wa`, `rw`, `rwt`).
    pub async fn open_file(&self, uri: &str, mode: &str) -> BrokerResult<FileHandle> {
        self.ensure_connected()?;
        self.dispatcher.open_file(self.ctx(), uri, mode).await
    }

    /// Registers a change observer for `(change_type, uri)`.
    pub async fn on(
        &self,
        change_type: ChangeType,
        uri: &str,
        callback: ChangeCallback,
    ) -> BrokerResult<()> {
        self.ensure_connected()?;
        let key = ResourceUri::parse(uri)?.normalized();
        self.hub.subscribe(change_type, &key, callback).await;
        Ok(())
    }

    /// Removes one observer, or all observers for the key when `callback`
    /// is `None`. Removing something absent is a no-op.
    pub async fn off(
        &self,
        change_type: ChangeType,
        uri: &str,
        callback: Option<&ChangeCallback>,
    ) -> BrokerResult<()> {
        self.ensure_connected()?;
        let key = ResourceUri::parse(uri)?.normalized();
        self.hub.unsubscribe(change_type, &key, callback).await;
        Ok(())
    }

    /// Fans a change notification out to observers of the URI without
    /// waiting for delivery.
    pub async fn notify_change(&self, uri: &str) -> BrokerResult<()> {
        self.ensure_connected()?;
        self.dispatcher.notify_change(uri).await
    }

    /// Returns the canonical form of a URI.
    pub async fn normalize_uri(&self, uri: &str) -> BrokerResult<String> {
        self.ensure_connected()?;
        self.resolver.normalize(uri).await
    }

    /// Maps a normalized URI back to its original form, failing with
    /// [`BrokerError::Resolution`] if it was never issued or its provider
    /// is gone.
    pub async fn denormalize_uri(&self, uri: &str) -> BrokerResult<String> {
        self.ensure_connected()?;
        self.resolver.denormalize(uri).await
    }
}
