//! In-memory tables: insertion-ordered rows with monotonically increasing
//! row ids.

use crate::error::{StorageError, StorageResult};
use datashare_types::{Value, ValuesBucket};
use indexmap::IndexMap;
use std::collections::HashMap;

/// One row: column → value in first-write order.
pub type Row = IndexMap<String, Value>;

/// A single in-memory table.
#[derive(Debug, Default)]
pub struct Table {
    next_row_id: i64,
    rows: Vec<(i64, Row)>,
    mime_type: Option<String>,
    file_types: Vec<String>,
    read_only: bool,
}

/// Default MIME type reported for tables without an explicit one.
pub(crate) const DEFAULT_MIME: &str = "application/json";

impl Table {
    /// Appends a row from a bucket; returns the assigned row id.
    pub fn insert(&mut self, bucket: &ValuesBucket) -> StorageResult<i64> {
        if bucket.is_empty() {
            return Err(StorageError::InvalidBucket("no columns".into()));
        }
        self.next_row_id += 1;
        let row: Row = bucket
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.rows.push((self.next_row_id, row));
        Ok(self.next_row_id)
    }

    /// Returns `(row_id, row)` pairs in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[(i64, Row)] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Merges a bucket into the rows at the given indices; new columns are
    /// appended in bucket order.
    pub fn update_rows(&mut self, indices: &[usize], bucket: &ValuesBucket) {
        for &index in indices {
            if let Some((_, row)) = self.rows.get_mut(index) {
                for (column, value) in bucket.iter() {
                    row.insert(column.to_string(), value.clone());
                }
            }
        }
    }

    /// Removes the rows at the given indices; returns how many were removed.
    pub fn delete_rows(&mut self, indices: &[usize]) -> i64 {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let before = self.rows.len();
        let mut position = 0usize;
        let mut cursor = 0usize;
        self.rows.retain(|_| {
            let drop = sorted.get(cursor) == Some(&position);
            if drop {
                cursor += 1;
            }
            position += 1;
            !drop
        });
        (before - self.rows.len()) as i64
    }

    /// Reported MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME)
    }

    pub fn set_mime_type(&mut self, mime: impl Into<String>) {
        self.mime_type = Some(mime.into());
    }

    /// MIME types of the files this table exposes.
    #[must_use]
    pub fn file_types(&self) -> &[String] {
        &self.file_types
    }

    pub fn set_file_types(&mut self, types: Vec<String>) {
        self.file_types = types;
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

/// Named tables, auto-created on first write.
#[derive(Debug, Default)]
pub struct TableStore {
    tables: HashMap<String, Table>,
}

impl TableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table, creating it if absent.
    pub fn table_mut(&mut self, name: &str) -> &mut Table {
        self.tables.entry(name.to_string()).or_default()
    }

    /// Returns the table if it exists.
    pub fn table(&self, name: &str) -> StorageResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))
    }

    /// Returns true when the table exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}
