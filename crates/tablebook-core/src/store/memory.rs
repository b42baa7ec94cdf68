//! Process-local document store.
//!
//! Intended for development and tests. Writes take the single write lock, so
//! the slot uniqueness check and the write it guards are atomic.

use super::{
    ReservationFilter, ReservationStore, StoreError, StoreResult, TableStore, sort_reservations,
    sort_tables,
};
use crate::model::{Document, Reservation, ReservationPatch, Table, TablePatch};
use crate::types::{DocumentId, RESERVATIONS, TABLES};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

#[derive(Debug, Default)]
struct Collections {
    reservations: BTreeMap<DocumentId, Reservation>,
    tables: BTreeMap<DocumentId, Table>,
}

impl Collections {
    fn slot_holder(&self, reservation: &Reservation) -> Option<DocumentId> {
        let filter = ReservationFilter::slot(&reservation.slot());
        self.reservations
            .iter()
            .find(|(_, existing)| filter.matches(existing))
            .map(|(id, _)| *id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert_reservation(&self, reservation: Reservation) -> StoreResult<DocumentId> {
        let mut inner = self.inner.write().await;
        if inner.slot_holder(&reservation).is_some() {
            return Err(StoreError::SlotTaken(reservation.slot()));
        }
        let id = DocumentId::generate();
        inner.reservations.insert(id, reservation);
        Ok(id)
    }

    async fn find_reservation(&self, id: DocumentId) -> StoreResult<Document<Reservation>> {
        let inner = self.inner.read().await;
        inner
            .reservations
            .get(&id)
            .map(|reservation| Document::new(id, reservation.clone()))
            .ok_or_else(|| StoreError::not_found(RESERVATIONS, id))
    }

    async fn find_reservations(
        &self,
        filter: ReservationFilter,
    ) -> StoreResult<Vec<Document<Reservation>>> {
        let inner = self.inner.read().await;
        let mut found: Vec<_> = inner
            .reservations
            .iter()
            .filter(|(_, reservation)| filter.matches(reservation))
            .map(|(id, reservation)| Document::new(*id, reservation.clone()))
            .collect();
        sort_reservations(&mut found);
        Ok(found)
    }

    async fn count_reservations(&self, filter: ReservationFilter) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        let count = inner
            .reservations
            .values()
            .filter(|reservation| filter.matches(reservation))
            .count();
        Ok(count as u64)
    }

    async fn update_reservation(
        &self,
        id: DocumentId,
        patch: ReservationPatch,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let mut updated = inner
            .reservations
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(RESERVATIONS, id))?;
        patch.apply(&mut updated);

        if inner
            .slot_holder(&updated)
            .is_some_and(|holder| holder != id)
        {
            return Err(StoreError::SlotTaken(updated.slot()));
        }
        inner.reservations.insert(id, updated);
        Ok(())
    }

    async fn delete_reservation(&self, id: DocumentId) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .reservations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(RESERVATIONS, id))
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn insert_table(&self, table: Table) -> StoreResult<DocumentId> {
        let id = DocumentId::generate();
        self.inner.write().await.tables.insert(id, table);
        Ok(id)
    }

    async fn find_tables(&self) -> StoreResult<Vec<Document<Table>>> {
        let inner = self.inner.read().await;
        let mut tables: Vec<_> = inner
            .tables
            .iter()
            .map(|(id, table)| Document::new(*id, table.clone()))
            .collect();
        sort_tables(&mut tables);
        Ok(tables)
    }

    async fn update_table(&self, id: DocumentId, patch: TablePatch) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let table = inner
            .tables
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(TABLES, id))?;
        patch.apply(table);
        Ok(())
    }
}
