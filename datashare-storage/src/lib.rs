//! In-memory table provider for the data-share broker.
//!
//! Implements the broker's `Provider` trait over plain in-memory tables.
//! It is the reference provider: it demonstrates the predicate evaluation,
//! row ordering, and all-or-nothing batch semantics a real storage-backed
//! provider must honor, and it doubles as the fixture provider for
//! integration tests (every operation is counted so tests can assert
//! whether the broker contacted it).
//!
//! # Architecture
//!
//! - Tables are keyed by the URI's last path segment
//! - Rows are insertion-ordered column→value maps with monotonically
//!   increasing row ids
//! - Predicates are evaluated with a left-fold over the operation chain
//!   (implicit AND, explicit OR), then ordering and limit are applied

mod error;
mod eval;
mod provider;
mod table;

pub use error::{StorageError, StorageResult};
pub use provider::MemoryProvider;
pub use table::{Table, TableStore};
