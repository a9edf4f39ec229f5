//! Shared test fixtures: a call-counting fake provider.

use async_trait::async_trait;
use datashare_broker::{
    FileHandle, OpenMode, Provider, ProviderFailure, ProviderResult, ResultSet,
};
use datashare_types::{Predicates, ResourceUri, ValuesBucket};
use std::sync::atomic::{AtomicU64, Ordering};

/// Provider stub that counts calls and optionally fails every operation.
#[derive(Default)]
pub struct FakeProvider {
    calls: AtomicU64,
    fail_with: Option<ProviderFailure>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every operation fails with the given code/message.
    pub fn failing(code: i32, message: &str) -> Self {
        Self {
            calls: AtomicU64::new(0),
            fail_with: Some(ProviderFailure::new(code, message)),
        }
    }

    /// Number of operations that reached this provider.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn record<T>(&self, ok: T) -> ProviderResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(failure) => Err(failure.clone()),
            None => Ok(ok),
        }
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn insert(&self, _uri: &ResourceUri, _bucket: &ValuesBucket) -> ProviderResult<i64> {
        self.record(1)
    }

    async fn batch_insert(
        &self,
        _uri: &ResourceUri,
        buckets: &[ValuesBucket],
    ) -> ProviderResult<i64> {
        self.record(buckets.len() as i64)
    }

    async fn update(
        &self,
        _uri: &ResourceUri,
        _predicates: &Predicates,
        _bucket: &ValuesBucket,
    ) -> ProviderResult<i64> {
        self.record(1)
    }

    async fn delete(&self, _uri: &ResourceUri, _predicates: &Predicates) -> ProviderResult<i64> {
        self.record(1)
    }

    async fn query(
        &self,
        _uri: &ResourceUri,
        _predicates: Option<&Predicates>,
        _columns: &[String],
    ) -> ProviderResult<ResultSet> {
        self.record(ResultSet::default())
    }

    async fn get_type(&self, _uri: &ResourceUri) -> ProviderResult<String> {
        self.record("application/json".to_string())
    }

    async fn get_file_types(
        &self,
        _uri: &ResourceUri,
        _mime_filter: &str,
    ) -> ProviderResult<Vec<String>> {
        self.record(vec!["text/plain".to_string()])
    }

    async fn open_file(&self, _uri: &ResourceUri, _mode: OpenMode) -> ProviderResult<FileHandle> {
        self.record(FileHandle { descriptor: 3 })
    }
}
