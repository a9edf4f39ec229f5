//! Operation dispatcher.
//!
//! Every operation follows the same shape: validate arguments, consult the
//! gate for proxy-mode callers, resolve the provider, delegate, and wrap
//! provider faults as [`BrokerError::Provider`]. Validation failures return
//! before any provider contact. Successful mutations fan out through the
//! notification hub.

use crate::error::{BrokerError, BrokerResult};
use crate::gate::{AccessKind, ProxyGate};
use crate::hub::ChangeHub;
use crate::provider::{FileHandle, OpenMode, Provider, ResultSet};
use crate::resolver::UriResolver;
use datashare_types::{CallerId, ChangeType, Predicates, ResourceUri, ValuesBucket};
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller identity and mode, carried into every dispatched operation.
#[derive(Debug, Clone, Copy)]
pub struct OpContext {
    pub caller: CallerId,
    /// Proxy-mode contexts are gated before every provider contact.
    pub proxy: bool,
}

/// Routes validated operations to resolved providers.
pub struct Dispatcher {
    resolver: Arc<UriResolver>,
    gate: Arc<ProxyGate>,
    hub: Arc<ChangeHub>,
}

impl Dispatcher {
    /// Creates a dispatcher over shared broker components.
    #[must_use]
    pub fn new(resolver: Arc<UriResolver>, gate: Arc<ProxyGate>, hub: Arc<ChangeHub>) -> Self {
        Self {
            resolver,
            gate,
            hub,
        }
    }

    /// Parses the URI, gates proxy-mode access, and resolves the provider.
    async fn target(
        &self,
        ctx: OpContext,
        uri: &str,
        kind: AccessKind,
    ) -> BrokerResult<(ResourceUri, Arc<dyn Provider>)> {
        let parsed = ResourceUri::parse(uri)?;
        if ctx.proxy {
            self.gate.check_access(ctx.caller, &parsed, kind).await?;
        }
        let provider = self.resolver.resolve(&parsed).await?;
        Ok((parsed, provider))
    }

    fn wrap(op: &'static str, uri: &ResourceUri, failure: crate::ProviderFailure) -> BrokerError {
        warn!(op, uri = %uri, code = failure.code, message = %failure.message, "provider failure");
        failure.into()
    }

    async fn notify_mutation(&self, uri: &ResourceUri) {
        self.hub
            .notify(ChangeType::DataChange, &uri.normalized())
            .await;
    }

    /// Inserts one row. Empty buckets are rejected before provider contact.
    pub async fn insert(
        &self,
        ctx: OpContext,
        uri: &str,
        bucket: &ValuesBucket,
    ) -> BrokerResult<i64> {
        if bucket.is_empty() {
            return Err(BrokerError::InvalidArgument("empty values bucket".into()));
        }
        let (parsed, provider) = self.target(ctx, uri, AccessKind::Write).await?;
        let row_id = provider
            .insert(&parsed, bucket)
            .await
            .map_err(|e| Self::wrap("insert", &parsed, e))?;
        self.notify_mutation(&parsed).await;
        Ok(row_id)
    }

    /// Inserts a batch, all-or-nothing at the provider boundary. Empty
    /// batches are rejected before provider contact.
    pub async fn batch_insert(
        &self,
        ctx: OpContext,
        uri: &str,
        buckets: &[ValuesBucket],
    ) -> BrokerResult<i64> {
        if buckets.is_empty() {
            return Err(BrokerError::InvalidArgument("empty bucket sequence".into()));
        }
        let (parsed, provider) = self.target(ctx, uri, AccessKind::Write).await?;
        let count = provider
            .batch_insert(&parsed, buckets)
            .await
            .map_err(|e| Self::wrap("batch_insert", &parsed, e))?;
        self.notify_mutation(&parsed).await;
        Ok(count)
    }

    /// Updates matching rows. Requires a non-empty predicate chain and a
    /// non-empty bucket.
    pub async fn update(
        &self,
        ctx: OpContext,
        uri: &str,
        predicates: &Predicates,
        bucket: &ValuesBucket,
    ) -> BrokerResult<i64> {
        if predicates.is_empty() {
            return Err(BrokerError::InvalidArgument("empty predicates".into()));
        }
        if bucket.is_empty() {
            return Err(BrokerError::InvalidArgument("empty values bucket".into()));
        }
        let (parsed, provider) = self.target(ctx, uri, AccessKind::Write).await?;
        let count = provider
            .update(&parsed, predicates, bucket)
            .await
            .map_err(|e| Self::wrap("update", &parsed, e))?;
        self.notify_mutation(&parsed).await;
        Ok(count)
    }

    /// Deletes matching rows. Requires a non-empty predicate chain.
    pub async fn delete(
        &self,
        ctx: OpContext,
        uri: &str,
        predicates: &Predicates,
    ) -> BrokerResult<i64> {
        if predicates.is_empty() {
            return Err(BrokerError::InvalidArgument("empty predicates".into()));
        }
        let (parsed, provider) = self.target(ctx, uri, AccessKind::Write).await?;
        let count = provider
            .delete(&parsed, predicates)
            .await
            .map_err(|e| Self::wrap("delete", &parsed, e))?;
        self.notify_mutation(&parsed).await;
        Ok(count)
    }

    /// Queries rows. Absent predicates mean a full scan — logged, not fatal.
    pub async fn query(
        &self,
        ctx: OpContext,
        uri: &str,
        predicates: Option<&Predicates>,
        columns: &[String],
    ) -> BrokerResult<ResultSet> {
        if predicates.is_none() {
            debug!(uri, "query without predicates, provider will full-scan");
        }
        let (parsed, provider) = self.target(ctx, uri, AccessKind::Read).await?;
        provider
            .query(&parsed, predicates, columns)
            .await
            .map_err(|e| Self::wrap("query", &parsed, e))
    }

    /// Returns the MIME type for the URI.
    pub async fn get_type(&self, ctx: OpContext, uri: &str) -> BrokerResult<String> {
        let (parsed, provider) = self.target(ctx, uri, AccessKind::Read).await?;
        provider
            .get_type(&parsed)
            .await
            .map_err(|e| Self::wrap("get_type", &parsed, e))
    }

    /// Returns matching file MIME types for the URI.
    pub async fn get_file_types(
        &self,
        ctx: OpContext,
        uri: &str,
        mime_filter: &str,
    ) -> BrokerResult<Vec<String>> {
        let (parsed, provider) = self.target(ctx, uri, AccessKind::Read).await?;
        provider
            .get_file_types(&parsed, mime_filter)
            .await
            .map_err(|e| Self::wrap("get_file_types", &parsed, e))
    }

    /// Opens a file under the URI. Unrecognized mode strings are rejected
    /// before provider contact.
    pub async fn open_file(
        &self,
        ctx: OpContext,
        uri: &str,
        mode: &str,
    ) -> BrokerResult<FileHandle> {
        let Some(open_mode) = OpenMode::parse(mode) else {
            return Err(BrokerError::InvalidArgument(format!(
                "unrecognized open mode: {mode}"
            )));
        };
        let kind = if open_mode.is_writable() {
            AccessKind::Write
        } else {
            AccessKind::Read
        };
        let (parsed, provider) = self.target(ctx, uri, kind).await?;
        provider
            .open_file(&parsed, open_mode)
            .await
            .map_err(|e| Self::wrap("open_file", &parsed, e))
    }

    /// Fans a change notification out to observers of the URI.
    ///
    /// Fire-and-forget: returns once delivery is scheduled, not completed.
    pub async fn notify_change(&self, uri: &str) -> BrokerResult<()> {
        let parsed = ResourceUri::parse(uri)?;
        self.hub
            .notify(ChangeType::DataChange, &parsed.normalized())
            .await;
        Ok(())
    }
}
