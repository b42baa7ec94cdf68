//! gRPC entry points for reservations and tables.
//!
//! The handlers translate protobuf messages into model drafts, delegate to the
//! transport-independent managers in `tablebook_core::service`, and map the
//! outcome back. One case is not an error status: a create whose slot is
//! already taken answers `Response { success: false }` with an OK status.

use crate::server::telemetry::{
    increment_compensations, increment_request_errors, increment_requests,
    increment_reservations_created, increment_slot_conflicts, increment_table_flag_failures,
    record_rpc_duration,
};
use core::future::Future;
use tablebook_core::{
    Error,
    model::{NewReservation, NewTable},
    proto::{
        self, reservation_service_server::ReservationService, table_service_server::TableService,
    },
    service::{ReservationManager, TableManager},
};
use tonic::{Request, Response, Status};

const SLOT_TAKEN: &str = "Reservation already exists for this table and date";

/// Times the call, counts it, and converts its error into a gRPC status.
async fn observe<T>(
    method: &'static str,
    call: impl Future<Output = tablebook_core::Result<T>>,
) -> Result<Response<T>, Status> {
    let start = std::time::Instant::now();
    increment_requests(method);

    let result = call.await;
    record_rpc_duration(method, start.elapsed().as_secs_f64() * 1000.0);

    result.map(Response::new).map_err(|err| {
        let status = Status::from(err);
        increment_request_errors(method, status.code());
        match status.code() {
            tonic::Code::Internal | tonic::Code::Aborted => {
                tracing::error!(method, code = ?status.code(), "{}", status.message())
            }
            code => tracing::debug!(method, ?code, "{}", status.message()),
        }
        status
    })
}

/// Counts the saga outcome of a failed create.
fn record_create_failure(err: &Error) {
    match err {
        Error::RolledBack { .. } => {
            increment_table_flag_failures();
            increment_compensations(true);
        }
        Error::Inconsistent { .. } => {
            increment_table_flag_failures();
            increment_compensations(false);
        }
        _ => {}
    }
}

/// Implements the `ReservationService` gRPC service.
#[derive(Clone)]
pub struct ReservationHandler {
    manager: ReservationManager,
}

impl ReservationHandler {
    pub fn new(manager: ReservationManager) -> Self {
        Self { manager }
    }
}

#[tonic::async_trait]
impl ReservationService for ReservationHandler {
    #[tracing::instrument(skip_all, fields(user_id = %req.get_ref().user_id))]
    async fn create_reservation(
        &self,
        req: Request<proto::CreateReservationRequest>,
    ) -> Result<Response<proto::Response>, Status> {
        let request = NewReservation::from(req.into_inner());
        observe("CreateReservation", async {
            match self.manager.create(request).await {
                Ok(id) => {
                    increment_reservations_created();
                    Ok(proto::Response::created(
                        "Reservation created successfully",
                        id,
                    ))
                }
                Err(Error::Conflict { .. }) => {
                    increment_slot_conflicts();
                    Ok(proto::Response::refused(SLOT_TAKEN))
                }
                Err(err) => {
                    record_create_failure(&err);
                    Err(err)
                }
            }
        })
        .await
    }

    async fn get_reservation_by_id(
        &self,
        req: Request<proto::GetReservationByIdRequest>,
    ) -> Result<Response<proto::Reservation>, Status> {
        let id = req.into_inner().id;
        observe("GetReservationById", async {
            self.manager.get(&id).await.map(Into::into)
        })
        .await
    }

    async fn get_reservations_by_user_id(
        &self,
        req: Request<proto::GetReservationsByUserIdRequest>,
    ) -> Result<Response<proto::Reservations>, Status> {
        let user_id = req.into_inner().user_id;
        observe("GetReservationsByUserId", async {
            self.manager.by_user(&user_id).await.map(Into::into)
        })
        .await
    }

    async fn get_reservations_by_date(
        &self,
        req: Request<proto::GetReservationsByDateRequest>,
    ) -> Result<Response<proto::Reservations>, Status> {
        let date = req.into_inner().reservation_date;
        observe("GetReservationsByDate", async {
            self.manager.by_date(&date).await.map(Into::into)
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(id = %req.get_ref().id))]
    async fn update_reservation(
        &self,
        req: Request<proto::UpdateReservationRequest>,
    ) -> Result<Response<proto::Response>, Status> {
        let (id, changes) = req.into_inner().into_parts();
        observe("UpdateReservation", async {
            self.manager
                .update(&id, changes)
                .await
                .map(|()| proto::Response::ok("Reservation updated successfully"))
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(id = %req.get_ref().id))]
    async fn delete_reservation(
        &self,
        req: Request<proto::DeleteReservationRequest>,
    ) -> Result<Response<proto::Response>, Status> {
        let id = req.into_inner().id;
        observe("DeleteReservation", async {
            self.manager
                .delete(&id)
                .await
                .map(|()| proto::Response::ok("Reservation deleted successfully"))
        })
        .await
    }
}

/// Implements the `TableService` gRPC service.
#[derive(Clone)]
pub struct TableHandler {
    manager: TableManager,
}

impl TableHandler {
    pub fn new(manager: TableManager) -> Self {
        Self { manager }
    }
}

#[tonic::async_trait]
impl TableService for TableHandler {
    #[tracing::instrument(skip_all, fields(number = req.get_ref().number))]
    async fn create_table(
        &self,
        req: Request<proto::CreateTableRequest>,
    ) -> Result<Response<proto::Response>, Status> {
        let request = NewTable::from(req.into_inner());
        observe("CreateTable", async {
            self.manager
                .create(request)
                .await
                .map(|id| proto::Response::created("Table created successfully", id))
        })
        .await
    }

    async fn get_tables(
        &self,
        _req: Request<proto::Empty>,
    ) -> Result<Response<proto::Tables>, Status> {
        observe("GetTables", async { self.manager.list().await.map(Into::into) }).await
    }

    #[tracing::instrument(skip_all, fields(id = %req.get_ref().id))]
    async fn update_table(
        &self,
        req: Request<proto::UpdateTableRequest>,
    ) -> Result<Response<proto::Response>, Status> {
        let (id, changes) = req.into_inner().into_parts();
        observe("UpdateTable", async {
            self.manager
                .update(&id, changes)
                .await
                .map(|()| proto::Response::ok("Table updated successfully"))
        })
        .await
    }

    async fn get_available_tables(
        &self,
        req: Request<proto::GetAvailableTablesRequest>,
    ) -> Result<Response<proto::Tables>, Status> {
        let date = req.into_inner().reservation_date;
        observe("GetAvailableTables", async {
            self.manager.available_on(&date).await.map(Into::into)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::Handlers;
    use std::sync::Arc;
    use tablebook_core::store::{MemoryStore, RedbStore};
    use tonic::Code;

    fn handlers() -> Handlers {
        Handlers::new(Arc::new(MemoryStore::new()))
    }

    async fn add_table(handlers: &Handlers, number: i32) -> String {
        handlers
            .tables
            .create_table(Request::new(proto::CreateTableRequest {
                number,
                capacity: 4,
                reserved: false,
            }))
            .await
            .unwrap()
            .into_inner()
            .id
    }

    fn booking(table_id: &str, time: &str) -> proto::CreateReservationRequest {
        proto::CreateReservationRequest {
            user_id: "user1".into(),
            table_id: table_id.into(),
            reservation_date: "01-01-2023".into(),
            reservation_time: time.into(),
            guest_count: 2,
            status: "confirmed".into(),
        }
    }

    async fn tables(handlers: &Handlers) -> Vec<proto::Table> {
        handlers
            .tables
            .get_tables(Request::new(proto::Empty {}))
            .await
            .unwrap()
            .into_inner()
            .tables
    }

    #[tokio::test]
    async fn create_reports_success_and_id() {
        let handlers = handlers();
        let table_id = add_table(&handlers, 1).await;

        let response = handlers
            .reservations
            .create_reservation(Request::new(booking(&table_id, "12:00")))
            .await
            .unwrap()
            .into_inner();
        assert!(response.success);
        assert_eq!(response.message, "Reservation created successfully");

        let reservation = handlers
            .reservations
            .get_reservation_by_id(Request::new(proto::GetReservationByIdRequest {
                id: response.id.clone(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(reservation.id, response.id);
        assert_eq!(reservation.table_id, table_id);
        assert_eq!(reservation.reservation_time, "12:00");
        assert_eq!(reservation.status, "confirmed");
        assert!(tables(&handlers).await[0].reserved);
    }

    #[tokio::test]
    async fn taken_slot_is_refused_with_ok_status() {
        let handlers = handlers();
        let table_id = add_table(&handlers, 1).await;
        handlers
            .reservations
            .create_reservation(Request::new(booking(&table_id, "12:00")))
            .await
            .unwrap();

        let response = handlers
            .reservations
            .create_reservation(Request::new(booking(&table_id, "12:00")))
            .await
            .unwrap()
            .into_inner();
        assert!(!response.success);
        assert_eq!(response.message, SLOT_TAKEN);
        assert!(response.id.is_empty());

        let by_date = handlers
            .reservations
            .get_reservations_by_date(Request::new(proto::GetReservationsByDateRequest {
                reservation_date: "01-01-2023".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(by_date.reservations.len(), 1);
    }

    #[tokio::test]
    async fn validation_failures_are_invalid_argument() {
        let handlers = handlers();
        let table_id = add_table(&handlers, 1).await;

        let status = handlers
            .reservations
            .create_reservation(Request::new(booking(&table_id, "12:30")))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "reservation time must end in :00");

        let status = handlers
            .tables
            .create_table(Request::new(proto::CreateTableRequest {
                number: 0,
                capacity: 4,
                reserved: false,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn missing_table_aborts_the_create() {
        let handlers = handlers();
        let status = handlers
            .reservations
            .create_reservation(Request::new(booking(
                "7f0c2a51-4a9f-4d8e-9b7a-3f51a8c0d6e2",
                "12:00",
            )))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Aborted);

        let by_user = handlers
            .reservations
            .get_reservations_by_user_id(Request::new(proto::GetReservationsByUserIdRequest {
                user_id: "user1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(by_user.reservations.is_empty());
    }

    #[tokio::test]
    async fn lookups_by_bad_or_unknown_id() {
        let handlers = handlers();
        let status = handlers
            .reservations
            .get_reservation_by_id(Request::new(proto::GetReservationByIdRequest {
                id: "60d5ec49f1d2c2a1d4e8b0c8".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = handlers
            .reservations
            .delete_reservation(Request::new(proto::DeleteReservationRequest {
                id: "7f0c2a51-4a9f-4d8e-9b7a-3f51a8c0d6e2".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn completing_a_reservation_frees_its_table() {
        let handlers = handlers();
        let table_id = add_table(&handlers, 1).await;
        let id = handlers
            .reservations
            .create_reservation(Request::new(booking(&table_id, "12:00")))
            .await
            .unwrap()
            .into_inner()
            .id;

        let response = handlers
            .reservations
            .update_reservation(Request::new(proto::UpdateReservationRequest {
                id: id.clone(),
                table_id: None,
                reservation_date: None,
                guest_count: None,
                status: Some("completed".into()),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.success);
        assert!(!tables(&handlers).await[0].reserved);

        let reservation = handlers
            .reservations
            .get_reservation_by_id(Request::new(proto::GetReservationByIdRequest { id }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(reservation.status, "completed");
        assert!(reservation.updated_at.is_some());
    }

    #[tokio::test]
    async fn table_lifecycle_and_availability() {
        let handlers = handlers();
        let first = add_table(&handlers, 5).await;
        let second = add_table(&handlers, 6).await;

        let listed = tables(&handlers).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].number, 5);
        assert_eq!(listed[0].capacity, 4);
        assert!(!listed[0].reserved);

        handlers
            .tables
            .update_table(Request::new(proto::UpdateTableRequest {
                id: second.clone(),
                capacity: Some(8),
                reserved: None,
            }))
            .await
            .unwrap();
        assert_eq!(tables(&handlers).await[1].capacity, 8);

        handlers
            .reservations
            .create_reservation(Request::new(booking(&first, "19:00")))
            .await
            .unwrap();

        let available = handlers
            .tables
            .get_available_tables(Request::new(proto::GetAvailableTablesRequest {
                reservation_date: "01-01-2023".into(),
            }))
            .await
            .unwrap()
            .into_inner()
            .tables;
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, second);
    }

    #[tokio::test]
    async fn redb_backed_handlers() {
        let handlers = Handlers::new(Arc::new(RedbStore::open_in_memory().unwrap()));
        let table_id = add_table(&handlers, 1).await;

        let created = handlers
            .reservations
            .create_reservation(Request::new(booking(&table_id, "20:00")))
            .await
            .unwrap()
            .into_inner();
        assert!(created.success);

        let refused = handlers
            .reservations
            .create_reservation(Request::new(booking(&table_id, "20:00")))
            .await
            .unwrap()
            .into_inner();
        assert!(!refused.success);
    }
}
