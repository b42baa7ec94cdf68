//! # Document store
//!
//! The persistence capability consumed by the orchestration layer. Two
//! collections are exposed through two traits so callers (and tests) can
//! depend on exactly the collection they touch:
//!
//! - [`ReservationStore`] - reservations, keyed by [`DocumentId`], with an
//!   exact-match filter on user, table, date and time.
//! - [`TableStore`] - dining tables.
//!
//! ## Backends
//!
//! - [`MemoryStore`] - process-local maps behind a `tokio` `RwLock`.
//! - [`RedbStore`] - an embedded `redb` database storing each document as JSON.
//!
//! Both backends enforce slot uniqueness: inserting a reservation, or moving
//! one with an update, onto a (table, date, time) slot that already holds a
//! reservation fails with [`StoreError::SlotTaken`] and writes nothing.

mod embedded;
mod memory;

pub use embedded::RedbStore;
pub use memory::MemoryStore;

use crate::model::{Document, Reservation, ReservationPatch, Slot, Table, TablePatch};
use crate::types::DocumentId;
use async_trait::async_trait;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Failures reported by a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No document in `{collection}` with id {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("Slot already taken: {0}")]
    SlotTaken(Slot),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// The backend could not serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn not_found(collection: &'static str, id: DocumentId) -> Self {
        StoreError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

/// Exact-match filter over reservation documents. Unset fields match
/// anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub user_id: Option<String>,
    pub table_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl ReservationFilter {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    pub fn slot(slot: &Slot) -> Self {
        Self {
            table_id: Some(slot.table_id.clone()),
            date: Some(slot.date.clone()),
            time: Some(slot.time.clone()),
            ..Self::default()
        }
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        fn eq(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().is_none_or(|expected| expected == actual)
        }
        eq(&self.user_id, &reservation.user_id)
            && eq(&self.table_id, &reservation.table_id)
            && eq(&self.date, &reservation.date)
            && eq(&self.time, &reservation.time)
    }
}

/// The reservation collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Inserts a reservation and returns its new identifier.
    async fn insert_reservation(&self, reservation: Reservation) -> StoreResult<DocumentId>;

    async fn find_reservation(&self, id: DocumentId) -> StoreResult<Document<Reservation>>;

    /// All reservations matching `filter`, oldest first.
    async fn find_reservations(
        &self,
        filter: ReservationFilter,
    ) -> StoreResult<Vec<Document<Reservation>>>;

    async fn count_reservations(&self, filter: ReservationFilter) -> StoreResult<u64>;

    async fn update_reservation(&self, id: DocumentId, patch: ReservationPatch)
    -> StoreResult<()>;

    async fn delete_reservation(&self, id: DocumentId) -> StoreResult<()>;
}

/// The dining table collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Inserts a table and returns its new identifier.
    async fn insert_table(&self, table: Table) -> StoreResult<DocumentId>;

    /// All tables ordered by table number.
    async fn find_tables(&self) -> StoreResult<Vec<Document<Table>>>;

    async fn update_table(&self, id: DocumentId, patch: TablePatch) -> StoreResult<()>;
}

pub(crate) fn sort_reservations(reservations: &mut [Document<Reservation>]) {
    reservations.sort_by(|a, b| {
        a.body
            .created_at
            .cmp(&b.body.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

pub(crate) fn sort_tables(tables: &mut [Document<Table>]) {
    tables.sort_by(|a, b| {
        a.body
            .number
            .cmp(&b.body.number)
            .then_with(|| a.id.cmp(&b.id))
    });
}
