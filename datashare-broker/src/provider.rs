//! The provider seam.
//!
//! A [`Provider`] owns a dataset and answers CRUD and metadata operations
//! for the URIs under its authority. The broker treats provider failures as
//! opaque `{code, message}` pairs; it never decodes them further.

use async_trait::async_trait;
use datashare_types::{Predicates, ResourceUri, Value, ValuesBucket};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderFailure>;

/// Opaque failure returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub code: i32,
    pub message: String,
}

impl ProviderFailure {
    /// Creates a failure with a code and message.
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider failure {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderFailure {}

/// File open mode, parsed from the conventional mode strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    /// `r` — read-only.
    Read,
    /// `w` — write-only.
    Write,
    /// `wt` — write-only, truncate existing content.
    WriteTruncate,
    /// `wa` — write-only, append.
    WriteAppend,
    /// `rw` — read and write.
    ReadWrite,
    /// `rwt` — read and write, truncate existing content.
    ReadWriteTruncate,
}

impl OpenMode {
    /// Parses a mode string; returns `None` for unrecognized modes.
    #[must_use]
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "r" => Some(Self::Read),
            "w" => Some(Self::Write),
            "wt" => Some(Self::WriteTruncate),
            "wa" => Some(Self::WriteAppend),
            "rw" => Some(Self::ReadWrite),
            "rwt" => Some(Self::ReadWriteTruncate),
            _ => None,
        }
    }

    /// Returns the conventional mode string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::WriteTruncate => "wt",
            Self::WriteAppend => "wa",
            Self::ReadWrite => "rw",
            Self::ReadWriteTruncate => "rwt",
        }
    }

    /// Returns true when the mode permits writing.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Handle to a file opened through a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub descriptor: i64,
}

/// A materialized query result: column names plus rows of typed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates a result set. Each row must be as wide as `columns`.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the column names in result order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Returns the index of a named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the value at (row, column index).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Returns the value at (row, column name).
    #[must_use]
    pub fn get_by_name(&self, row: usize, name: &str) -> Option<&Value> {
        self.column_index(name).and_then(|col| self.get(row, col))
    }

    /// Returns all rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

/// A dataset owner answering CRUD and metadata operations for its authority.
///
/// Implementations must bound their own latency (the broker applies no
/// timeout of its own) and must treat `batch_insert` as all-or-nothing.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Inserts one row; returns the new row id.
    async fn insert(&self, uri: &ResourceUri, bucket: &ValuesBucket) -> ProviderResult<i64>;

    /// Inserts a batch atomically; returns the number of rows inserted.
    async fn batch_insert(
        &self,
        uri: &ResourceUri,
        buckets: &[ValuesBucket],
    ) -> ProviderResult<i64>;

    /// Updates matching rows; returns the affected count.
    async fn update(
        &self,
        uri: &ResourceUri,
        predicates: &Predicates,
        bucket: &ValuesBucket,
    ) -> ProviderResult<i64>;

    /// Deletes matching rows; returns the affected count.
    async fn delete(&self, uri: &ResourceUri, predicates: &Predicates) -> ProviderResult<i64>;

    /// Queries rows. Absent predicates mean a full scan; an empty `columns`
    /// slice selects every column.
    async fn query(
        &self,
        uri: &ResourceUri,
        predicates: Option<&Predicates>,
        columns: &[String],
    ) -> ProviderResult<ResultSet>;

    /// Returns the MIME type of data under the URI.
    async fn get_type(&self, uri: &ResourceUri) -> ProviderResult<String>;

    /// Returns the MIME types of files under the URI matching `mime_filter`
    /// (`*/*`, `type/*`, or an exact type).
    async fn get_file_types(
        &self,
        uri: &ResourceUri,
        mime_filter: &str,
    ) -> ProviderResult<Vec<String>>;

    /// Opens a file under the URI.
    async fn open_file(&self, uri: &ResourceUri, mode: OpenMode) -> ProviderResult<FileHandle>;
}
