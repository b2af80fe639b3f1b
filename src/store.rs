//! The contract between the commands and the persistent store of records.
//!
//! Commands receive the store explicitly (through `Config`) and aggregation only ever sees the
//! records returned by `fetch_all`.

use crate::model::{NewRecord, Record};
use crate::Result;
use serde::Serialize;

/// The records read from the store, minus any rows that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fetched {
    /// Valid records, ordered by date then ID.
    pub records: Vec<Record>,
    /// The number of stored rows that were skipped because their date or amount is unusable.
    pub quarantined: usize,
}

/// A persistent store of records. Each mutating call commits before it returns; an `Err` from
/// one of them means nothing was changed.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Reads every record. A row that cannot be turned into a `Record` is skipped with a warning
    /// and counted in `Fetched::quarantined` rather than failing the whole read.
    async fn fetch_all(&self) -> Result<Fetched>;

    /// Reads one record by ID.
    async fn get(&self, id: &str) -> Result<Option<Record>>;

    /// Stores a new record under a generated ID and returns it.
    async fn insert(&self, record: NewRecord) -> Result<Record>;

    /// Replaces the fields of the record with the same ID.
    ///
    /// # Errors
    /// - Returns an error if no record has that ID.
    async fn update(&self, record: &Record) -> Result<Record>;

    /// Deletes the records with the given IDs, all or nothing. An ID given more than once is
    /// deleted once. Returns the IDs deleted, in the order first given.
    ///
    /// # Errors
    /// - Returns an error, deleting nothing, if any ID is not found.
    async fn delete(&self, ids: &[String]) -> Result<Vec<String>>;
}
