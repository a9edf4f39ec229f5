//! `Provider` implementation over the in-memory table store.

use crate::error::{StorageError, StorageResult};
use crate::eval;
use crate::table::{Row, TableStore};
use async_trait::async_trait;
use datashare_broker::{
    FileHandle, OpenMode, Provider, ProviderFailure, ProviderResult, ResultSet,
};
use datashare_types::{Predicates, ResourceUri, Value, ValuesBucket};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory provider. Tables are addressed by the URI's last path segment
/// and auto-created on first write.
pub struct MemoryProvider {
    store: RwLock<TableStore>,
    calls: AtomicU64,
    next_descriptor: AtomicI64,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    /// Creates a provider with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: RwLock::new(TableStore::new()),
            calls: AtomicU64::new(0),
            next_descriptor: AtomicI64::new(100),
        }
    }

    /// Number of operations that reached this provider. Lets broker tests
    /// assert that validation failures never contact the provider.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of rows currently in a table (0 if absent).
    pub async fn row_count(&self, table: &str) -> usize {
        self.store
            .read()
            .await
            .table(table)
            .map_or(0, |t| t.row_count())
    }

    /// Marks a table read-only; `open_file` refuses write modes on it.
    pub async fn set_read_only(&self, table: &str, read_only: bool) {
        self.store
            .write()
            .await
            .table_mut(table)
            .set_read_only(read_only);
    }

    /// Sets the MIME type reported for a table.
    pub async fn set_mime_type(&self, table: &str, mime: &str) {
        self.store.write().await.table_mut(table).set_mime_type(mime);
    }

    /// Sets the file MIME types a table exposes.
    pub async fn set_file_types(&self, table: &str, types: Vec<String>) {
        self.store.write().await.table_mut(table).set_file_types(types);
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn table_name(uri: &ResourceUri) -> StorageResult<String> {
        uri.last_segment()
            .map(str::to_string)
            .ok_or(StorageError::EmptyTableName)
    }
}

/// Projects matched rows onto the requested columns. An empty request
/// selects every column, in first-seen order across the matched rows.
fn project(rows: &[(i64, Row)], matched: &[usize], columns: &[String]) -> ResultSet {
    let selected: Vec<String> = if columns.is_empty() {
        let mut seen = Vec::new();
        for &index in matched {
            for column in rows[index].1.keys() {
                if !seen.contains(column) {
                    seen.push(column.clone());
                }
            }
        }
        seen
    } else {
        columns.to_vec()
    };

    let out_rows: Vec<Vec<Value>> = matched
        .iter()
        .map(|&index| {
            selected
                .iter()
                .map(|column| rows[index].1.get(column).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    ResultSet::new(selected, out_rows)
}

#[async_trait]
impl Provider for MemoryProvider {
    async fn insert(&self, uri: &ResourceUri, bucket: &ValuesBucket) -> ProviderResult<i64> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;
        let mut store = self.store.write().await;
        let row_id = store
            .table_mut(&table)
            .insert(bucket)
            .map_err(ProviderFailure::from)?;
        debug!(table, row_id, "row inserted");
        Ok(row_id)
    }

    async fn batch_insert(
        &self,
        uri: &ResourceUri,
        buckets: &[ValuesBucket],
    ) -> ProviderResult<i64> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;

        // All-or-nothing: validate the whole batch before touching the table.
        if let Some(position) = buckets.iter().position(ValuesBucket::is_empty) {
            return Err(
                StorageError::InvalidBucket(format!("empty bucket at index {position}")).into(),
            );
        }

        let mut store = self.store.write().await;
        let target = store.table_mut(&table);
        for bucket in buckets {
            target.insert(bucket).map_err(ProviderFailure::from)?;
        }
        debug!(table, count = buckets.len(), "batch inserted");
        Ok(buckets.len() as i64)
    }

    async fn update(
        &self,
        uri: &ResourceUri,
        predicates: &Predicates,
        bucket: &ValuesBucket,
    ) -> ProviderResult<i64> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;
        let mut store = self.store.write().await;
        store.table(&table).map_err(ProviderFailure::from)?;
        let target = store.table_mut(&table);
        let matched = eval::select(predicates, target.rows());
        target.update_rows(&matched, bucket);
        Ok(matched.len() as i64)
    }

    async fn delete(&self, uri: &ResourceUri, predicates: &Predicates) -> ProviderResult<i64> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;
        let mut store = self.store.write().await;
        store.table(&table).map_err(ProviderFailure::from)?;
        let target = store.table_mut(&table);
        let matched = eval::select(predicates, target.rows());
        Ok(target.delete_rows(&matched))
    }

    async fn query(
        &self,
        uri: &ResourceUri,
        predicates: Option<&Predicates>,
        columns: &[String],
    ) -> ProviderResult<ResultSet> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;
        let store = self.store.read().await;
        let target = store.table(&table).map_err(ProviderFailure::from)?;

        let full_scan = Predicates::new();
        let predicates = predicates.unwrap_or(&full_scan);
        let matched = eval::select(predicates, target.rows());
        Ok(project(target.rows(), &matched, columns))
    }

    async fn get_type(&self, uri: &ResourceUri) -> ProviderResult<String> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;
        let store = self.store.read().await;
        Ok(store
            .table(&table)
            .map_err(ProviderFailure::from)?
            .mime_type()
            .to_string())
    }

    async fn get_file_types(
        &self,
        uri: &ResourceUri,
        mime_filter: &str,
    ) -> ProviderResult<Vec<String>> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;
        let store = self.store.read().await;
        let types = store
            .table(&table)
            .map_err(ProviderFailure::from)?
            .file_types();

        let matched = types
            .iter()
            .filter(|mime| mime_matches(mime_filter, mime))
            .cloned()
            .collect();
        Ok(matched)
    }

    async fn open_file(&self, uri: &ResourceUri, mode: OpenMode) -> ProviderResult<FileHandle> {
        self.record();
        let table = Self::table_name(uri).map_err(ProviderFailure::from)?;
        let store = self.store.read().await;
        let target = store.table(&table).map_err(ProviderFailure::from)?;
        if mode.is_writable() && target.is_read_only() {
            return Err(StorageError::ReadOnly(table).into());
        }
        let descriptor = self.next_descriptor.fetch_add(1, Ordering::SeqCst);
        Ok(FileHandle { descriptor })
    }
}

/// MIME filter matching: `*/*` matches everything, `type/*` matches the
/// major type, anything else is an exact match.
fn mime_matches(filter: &str, mime: &str) -> bool {
    if filter == "*/*" || filter == "*" {
        return true;
    }
    if let Some(major) = filter.strip_suffix("/*") {
        return mime.split('/').next() == Some(major);
    }
    filter == mime
}
