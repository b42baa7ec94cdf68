//! redb-backed document store.
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `reservations` | document id | JSON `Document<Reservation>` | Reservation documents |
//! | `reservation_slots` | slot key | document id | Slot uniqueness index |
//! | `tables` | document id | JSON `Document<Table>` | Dining table documents |
//!
//! Documents are stored whole, `_id` included, using the same field names as
//! the serde model, so a dump of the database reads like the document
//! collections it replaces.
//!
//! # Slot index
//!
//! `reservation_slots` maps `(table, date, time)` to the reservation holding
//! it. Inserts, slot-moving updates and deletes maintain the index inside the
//! same write transaction as the document, so a taken slot can never be
//! double-booked even when two requests pass the availability pre-check
//! concurrently.

use super::{
    ReservationFilter, ReservationStore, StoreError, StoreResult, TableStore, sort_reservations,
    sort_tables,
};
use crate::model::{Document, Reservation, ReservationPatch, Slot, Table, TablePatch};
use crate::types::{DocumentId, RESERVATIONS, TABLES};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

type DocumentTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Reservation documents: key = document id, value = JSON document
const RESERVATIONS_TABLE: DocumentTable = TableDefinition::new(RESERVATIONS);

/// Dining table documents: key = document id, value = JSON document
const TABLES_TABLE: DocumentTable = TableDefinition::new(TABLES);

/// Slot index: key = slot key, value = id of the reservation holding the slot
const SLOTS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("reservation_slots");

fn slot_key(slot: &Slot) -> String {
    format!("{}\u{1f}{}\u{1f}{}", slot.table_id, slot.date, slot.time)
}

/// Document store backed by an embedded redb database.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// Open a database that lives only in memory.
    pub fn open_in_memory() -> StoreResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(RESERVATIONS_TABLE)?;
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(SLOTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Runs `f` in a write transaction, committing on success and aborting on
    /// error.
    fn write<T>(&self, f: impl FnOnce(&WriteTransaction) -> StoreResult<T>) -> StoreResult<T> {
        let txn = self.db.begin_write()?;
        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                txn.abort()?;
                Err(err)
            }
        }
    }

    fn read_document<T: DeserializeOwned>(
        &self,
        definition: DocumentTable,
        collection: &'static str,
        id: DocumentId,
    ) -> StoreResult<Document<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(definition)?;
        let key = id.to_string();
        let document: Option<Document<T>> = table
            .get(key.as_str())?
            .map(|value| serde_json::from_slice(value.value()))
            .transpose()?;
        document.ok_or_else(|| StoreError::not_found(collection, id))
    }

    fn read_documents<T: DeserializeOwned>(
        &self,
        definition: DocumentTable,
    ) -> StoreResult<Vec<Document<T>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(definition)?;

        let mut documents = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            documents.push(serde_json::from_slice(value.value())?);
        }
        Ok(documents)
    }
}

fn get_document<T: DeserializeOwned>(
    txn: &WriteTransaction,
    definition: DocumentTable,
    id: &str,
) -> StoreResult<Option<Document<T>>> {
    let table = txn.open_table(definition)?;
    let document: Option<Document<T>> = table
        .get(id)?
        .map(|value| serde_json::from_slice(value.value()))
        .transpose()?;
    Ok(document)
}

fn put_document<T: Serialize>(
    txn: &WriteTransaction,
    definition: DocumentTable,
    document: &Document<T>,
) -> StoreResult<()> {
    let mut table = txn.open_table(definition)?;
    let value = serde_json::to_vec(document)?;
    table.insert(document.id.to_string().as_str(), value.as_slice())?;
    Ok(())
}

/// Points `slot` at `id`, failing if another reservation already holds it.
fn claim_slot(txn: &WriteTransaction, slot: &Slot, id: &str) -> StoreResult<()> {
    let mut slots = txn.open_table(SLOTS_TABLE)?;
    let key = slot_key(slot);
    let holder = slots.get(key.as_str())?.map(|guard| guard.value().to_string());
    if holder.is_some_and(|holder| holder != id) {
        return Err(StoreError::SlotTaken(slot.clone()));
    }
    slots.insert(key.as_str(), id)?;
    Ok(())
}

fn release_slot(txn: &WriteTransaction, slot: &Slot) -> StoreResult<()> {
    let mut slots = txn.open_table(SLOTS_TABLE)?;
    slots.remove(slot_key(slot).as_str())?;
    Ok(())
}

#[async_trait]
impl ReservationStore for RedbStore {
    async fn insert_reservation(&self, reservation: Reservation) -> StoreResult<DocumentId> {
        let document = Document::new(DocumentId::generate(), reservation);
        self.write(|txn| {
            claim_slot(txn, &document.body.slot(), &document.id.to_string())?;
            put_document(txn, RESERVATIONS_TABLE, &document)
        })?;
        Ok(document.id)
    }

    async fn find_reservation(&self, id: DocumentId) -> StoreResult<Document<Reservation>> {
        self.read_document(RESERVATIONS_TABLE, RESERVATIONS, id)
    }

    async fn find_reservations(
        &self,
        filter: ReservationFilter,
    ) -> StoreResult<Vec<Document<Reservation>>> {
        let mut found: Vec<Document<Reservation>> = self
            .read_documents::<Reservation>(RESERVATIONS_TABLE)?
            .into_iter()
            .filter(|document| filter.matches(&document.body))
            .collect();
        sort_reservations(&mut found);
        Ok(found)
    }

    async fn count_reservations(&self, filter: ReservationFilter) -> StoreResult<u64> {
        let found: Vec<Document<Reservation>> = self.read_documents(RESERVATIONS_TABLE)?;
        let count = found
            .iter()
            .filter(|document| filter.matches(&document.body))
            .count();
        Ok(count as u64)
    }

    async fn update_reservation(
        &self,
        id: DocumentId,
        patch: ReservationPatch,
    ) -> StoreResult<()> {
        let key = id.to_string();
        self.write(|txn| {
            let mut document: Document<Reservation> =
                get_document(txn, RESERVATIONS_TABLE, &key)?
                    .ok_or_else(|| StoreError::not_found(RESERVATIONS, id))?;

            let previous = document.body.slot();
            patch.apply(&mut document.body);
            let current = document.body.slot();
            if current != previous {
                claim_slot(txn, &current, &key)?;
                release_slot(txn, &previous)?;
            }
            put_document(txn, RESERVATIONS_TABLE, &document)
        })
    }

    async fn delete_reservation(&self, id: DocumentId) -> StoreResult<()> {
        let key = id.to_string();
        self.write(|txn| {
            let removed = {
                let mut table = txn.open_table(RESERVATIONS_TABLE)?;
                let removed: Option<Document<Reservation>> = table
                    .remove(key.as_str())?
                    .map(|value| serde_json::from_slice(value.value()))
                    .transpose()?;
                removed
            };
            let document = removed.ok_or_else(|| StoreError::not_found(RESERVATIONS, id))?;
            release_slot(txn, &document.body.slot())
        })
    }
}

#[async_trait]
impl TableStore for RedbStore {
    async fn insert_table(&self, table: Table) -> StoreResult<DocumentId> {
        let document = Document::new(DocumentId::generate(), table);
        self.write(|txn| put_document(txn, TABLES_TABLE, &document))?;
        Ok(document.id)
    }

    async fn find_tables(&self) -> StoreResult<Vec<Document<Table>>> {
        let mut tables: Vec<Document<Table>> = self.read_documents(TABLES_TABLE)?;
        sort_tables(&mut tables);
        Ok(tables)
    }

    async fn update_table(&self, id: DocumentId, patch: TablePatch) -> StoreResult<()> {
        let key = id.to_string();
        self.write(|txn| {
            let mut document: Document<Table> = get_document(txn, TABLES_TABLE, &key)?
                .ok_or_else(|| StoreError::not_found(TABLES, id))?;
            patch.apply(&mut document.body);
            put_document(txn, TABLES_TABLE, &document)
        })
    }
}
