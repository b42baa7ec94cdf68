use crate::model::{
    Document, NewReservation, Reservation, ReservationChanges, Slot, TablePatch,
};
use crate::store::{ReservationFilter, ReservationStore, StoreError, TableStore};
use crate::types::DocumentId;
use crate::{Error, Result, validation};
use chrono::Utc;
use std::sync::Arc;

/// Reservation operations over the reservation and table collections.
///
/// Creating a reservation touches both collections: the reservation is
/// inserted, then its table is flagged as reserved. The two writes are not
/// atomic; if the second fails the insert is undone with a compensating
/// delete.
#[derive(Clone)]
pub struct ReservationManager {
    reservations: Arc<dyn ReservationStore>,
    tables: Arc<dyn TableStore>,
}

impl ReservationManager {
    pub fn new(reservations: Arc<dyn ReservationStore>, tables: Arc<dyn TableStore>) -> Self {
        Self {
            reservations,
            tables,
        }
    }

    /// Returns `true` if any reservation already occupies `slot`.
    ///
    /// This is an exact match on (table, date, time), not an overlap check:
    /// reservations always start on the hour.
    pub async fn is_slot_taken(&self, slot: &Slot) -> Result<bool> {
        let count = self
            .reservations
            .count_reservations(ReservationFilter::slot(slot))
            .await
            .inspect_err(|e| tracing::warn!(%slot, error = %e, "failed to check existing reservations"))?;
        Ok(count > 0)
    }

    /// Books a slot and marks its table reserved.
    ///
    /// Order of operations:
    ///
    /// 1. availability check, returning [`Error::Conflict`] without writing;
    /// 2. validation of the complete record, creation time included;
    /// 3. reservation insert;
    /// 4. table flag update, undone by deleting the reservation if it fails.
    #[tracing::instrument(
        skip_all,
        fields(table_id = %request.table_id, date = %request.date, time = %request.time)
    )]
    pub async fn create(&self, mut request: NewReservation) -> Result<DocumentId> {
        if let Ok(table_id) = DocumentId::parse(&request.table_id) {
            request.table_id = table_id.to_string();
        }

        let slot = request.slot();
        if self.is_slot_taken(&slot).await? {
            tracing::info!("slot already reserved");
            return Err(Error::Conflict { slot });
        }

        let reservation = validation::validate_reservation(&request, Utc::now())?;
        let table_id = DocumentId::parse(&reservation.table_id)?;

        let id = self
            .reservations
            .insert_reservation(reservation)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to insert reservation"))?;

        if let Err(err) = self
            .tables
            .update_table(table_id, TablePatch::reserved(true, Utc::now()))
            .await
        {
            return Err(self.undo_insert(id, &request.table_id, err).await);
        }

        tracing::info!(reservation_id = %id, "reservation created");
        Ok(id)
    }

    async fn undo_insert(&self, id: DocumentId, table_id: &str, cause: StoreError) -> Error {
        tracing::warn!(
            reservation_id = %id,
            table_id,
            error = %cause,
            "failed to mark table reserved, removing reservation"
        );
        match self.reservations.delete_reservation(id).await {
            Ok(()) => Error::RolledBack {
                table_id: table_id.to_string(),
                source: cause,
            },
            Err(err) => {
                tracing::error!(
                    reservation_id = %id,
                    table_id,
                    error = %err,
                    cause = %cause,
                    "failed to remove reservation after table update failure"
                );
                Error::Inconsistent {
                    reservation_id: id,
                    source: err,
                }
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<Document<Reservation>> {
        let id = DocumentId::parse(id).inspect_err(|e| tracing::debug!(error = %e))?;
        let reservation = self
            .reservations
            .find_reservation(id)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "failed to find reservation"))?;
        Ok(reservation)
    }

    /// All reservations made by `user_id`. No match is an empty list.
    pub async fn by_user(&self, user_id: &str) -> Result<Vec<Document<Reservation>>> {
        let found = self
            .reservations
            .find_reservations(ReservationFilter::user(user_id))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to find reservations"))?;
        Ok(found)
    }

    /// All reservations on `date`. No match is an empty list.
    pub async fn by_date(&self, date: &str) -> Result<Vec<Document<Reservation>>> {
        let found = self
            .reservations
            .find_reservations(ReservationFilter::date(date))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to find reservations"))?;
        Ok(found)
    }

    /// Applies the supplied fields and stamps the update time.
    ///
    /// Moving a reservation to `completed` or `cancelled` then frees its
    /// table. A failure at that point is returned even though the reservation
    /// update has already been committed.
    #[tracing::instrument(skip_all, fields(reservation_id = id))]
    pub async fn update(&self, id: &str, changes: ReservationChanges) -> Result<()> {
        let id = DocumentId::parse(id)?;
        let mut patch = validation::validate_changes(changes, Utc::now())?;
        if let Some(table_id) = patch.table_id.as_mut() {
            *table_id = DocumentId::parse(table_id)?.to_string();
        }
        let releases_table = patch.releases_table();

        self.reservations
            .update_reservation(id, patch)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to update reservation"))?;

        if releases_table {
            let reservation = self
                .reservations
                .find_reservation(id)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "failed to find updated reservation"))?;
            let table_id = DocumentId::parse(&reservation.body.table_id)?;
            self.tables
                .update_table(table_id, TablePatch::reserved(false, Utc::now()))
                .await
                .inspect_err(|e| tracing::warn!(%table_id, error = %e, "failed to free table"))?;
        }
        Ok(())
    }

    /// Removes a reservation. The table flag is left as it is.
    #[tracing::instrument(skip_all, fields(reservation_id = id))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = DocumentId::parse(id)?;
        self.reservations
            .delete_reservation(id)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to delete reservation"))?;
        Ok(())
    }
}
