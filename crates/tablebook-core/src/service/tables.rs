use crate::model::{Document, NewTable, Table, TableChanges};
use crate::store::{ReservationFilter, ReservationStore, TableStore};
use crate::types::DocumentId;
use crate::{Result, validation};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Dining table operations.
#[derive(Clone)]
pub struct TableManager {
    tables: Arc<dyn TableStore>,
    reservations: Arc<dyn ReservationStore>,
}

impl TableManager {
    pub fn new(tables: Arc<dyn TableStore>, reservations: Arc<dyn ReservationStore>) -> Self {
        Self {
            tables,
            reservations,
        }
    }

    #[tracing::instrument(skip_all, fields(number = request.number))]
    pub async fn create(&self, request: NewTable) -> Result<DocumentId> {
        let table = validation::validate_table(&request)?;
        let id = self
            .tables
            .insert_table(table)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to insert table"))?;
        tracing::info!(table_id = %id, "table created");
        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<Document<Table>>> {
        let tables = self
            .tables
            .find_tables()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to list tables"))?;
        Ok(tables)
    }

    #[tracing::instrument(skip_all, fields(table_id = id))]
    pub async fn update(&self, id: &str, changes: TableChanges) -> Result<()> {
        let id = DocumentId::parse(id)?;
        let patch = validation::validate_table_changes(changes, Utc::now())?;
        self.tables
            .update_table(id, patch)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to update table"))?;
        Ok(())
    }

    /// Tables with no reservation of any status on `date`.
    ///
    /// Availability is derived from the reservations alone; the stored
    /// `reserved` flag plays no part.
    pub async fn available_on(&self, date: &str) -> Result<Vec<Document<Table>>> {
        let booked: HashSet<DocumentId> = self
            .reservations
            .find_reservations(ReservationFilter::date(date))
            .await
            .inspect_err(|e| tracing::warn!(date, error = %e, "failed to find reservations"))?
            .into_iter()
            .filter_map(|reservation| DocumentId::parse(&reservation.body.table_id).ok())
            .collect();

        let tables = self.list().await?;
        Ok(tables
            .into_iter()
            .filter(|table| !booked.contains(&table.id))
            .collect())
    }
}
