//! URI resolution: authority → provider lookup plus the
//! normalize/denormalize pair.
//!
//! Denormalization only succeeds for normalized forms this resolver issued
//! and whose authority is still registered — it either returns the original
//! text or fails with [`BrokerError::Resolution`], never a URI that would
//! resolve to a different provider.
//!
//! The issuance table retains one entry per distinct URI ever normalized,
//! for the life of the resolver. Callers normalizing an unbounded set of
//! URIs should scope the broker (and with it this table) to the workload
//! rather than the process.

use crate::error::{BrokerError, BrokerResult};
use crate::provider::Provider;
use datashare_types::ResourceUri;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Registry mapping URI authorities to providers, with normalization state.
#[derive(Default)]
pub struct UriResolver {
    /// authority → provider.
    providers: RwLock<HashMap<String, Arc<dyn Provider>>>,
    /// normalized form → original text, recorded at issuance.
    issued: RwLock<HashMap<String, String>>,
}

impl UriResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider for an authority, replacing any previous one.
    pub async fn register_provider(&self, authority: &str, provider: Arc<dyn Provider>) {
        info!(authority, "registering provider");
        self.providers
            .write()
            .await
            .insert(authority.to_string(), provider);
    }

    /// Unregisters the provider for an authority. Returns false if none was
    /// registered.
    pub async fn unregister_provider(&self, authority: &str) -> bool {
        let removed = self.providers.write().await.remove(authority).is_some();
        if removed {
            info!(authority, "unregistered provider");
        }
        removed
    }

    /// Returns true when a provider is registered for the authority.
    pub async fn has_authority(&self, authority: &str) -> bool {
        self.providers.read().await.contains_key(authority)
    }

    /// Resolves a parsed URI to its provider.
    pub async fn resolve(&self, uri: &ResourceUri) -> BrokerResult<Arc<dyn Provider>> {
        let authority = uri.authority();
        self.providers
            .read()
            .await
            .get(authority)
            .cloned()
            .ok_or_else(|| BrokerError::UnknownAuthority(authority.to_string()))
    }

    /// Parses and resolves in one step.
    pub async fn resolve_str(&self, uri: &str) -> BrokerResult<(ResourceUri, Arc<dyn Provider>)> {
        let parsed = ResourceUri::parse(uri)?;
        let provider = self.resolve(&parsed).await?;
        Ok((parsed, provider))
    }

    /// Returns the canonical form of a URI, recording the issuance so that
    /// [`Self::denormalize`] can later recover the original.
    ///
    /// First issuance wins: normalizing an already-normalized form does not
    /// overwrite the recorded original, keeping the function idempotent.
    pub async fn normalize(&self, uri: &str) -> BrokerResult<String> {
        let parsed = ResourceUri::parse(uri)?;
        let normalized = parsed.normalized();
        self.issued
            .write()
            .await
            .entry(normalized.clone())
            .or_insert_with(|| uri.to_string());
        debug!(%normalized, "issued normalized URI");
        Ok(normalized)
    }

    /// Maps a normalized URI back to the original text it was issued for.
    ///
    /// Fails with [`BrokerError::Resolution`] when the form was never issued
    /// here, or when the original's authority is no longer registered (the
    /// provider may have been revoked between the two calls).
    pub async fn denormalize(&self, uri: &str) -> BrokerResult<String> {
        let original = self
            .issued
            .read()
            .await
            .get(uri)
            .cloned()
            .ok_or_else(|| BrokerError::Resolution(format!("not issued by this resolver: {uri}")))?;

        // Issued entries were parseable at normalize time; a parse failure
        // here means the table was corrupted, surface it as resolution loss.
        let parsed = ResourceUri::parse(&original)
            .map_err(|e| BrokerError::Resolution(e.to_string()))?;
        if !self.has_authority(parsed.authority()).await {
            return Err(BrokerError::Resolution(format!(
                "authority no longer registered: {}",
                parsed.authority()
            )));
        }
        Ok(original)
    }
}
