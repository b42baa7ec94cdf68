//! Conversions between the protobuf messages and the model.
//!
//! Requests convert into unvalidated drafts ([`NewReservation`],
//! [`ReservationChanges`], ...); the orchestration layer validates them.
//! Stored documents convert into response messages with RFC 3339 timestamps.

use crate::model::{
    Document, NewReservation, NewTable, Reservation, ReservationChanges, Table, TableChanges,
};
use crate::proto;
use crate::types::DocumentId;
use chrono::{DateTime, SecondsFormat, Utc};

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn int32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl From<Document<Reservation>> for proto::Reservation {
    fn from(Document { id, body }: Document<Reservation>) -> Self {
        Self {
            id: id.to_string(),
            user_id: body.user_id,
            table_id: body.table_id,
            reservation_date: body.date,
            guest_count: int32(body.guest_count),
            status: body.status.to_string(),
            reservation_time: body.time,
            created_at: timestamp(body.created_at),
            updated_at: body.updated_at.map(timestamp),
        }
    }
}

impl From<Vec<Document<Reservation>>> for proto::Reservations {
    fn from(reservations: Vec<Document<Reservation>>) -> Self {
        Self {
            reservations: reservations.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Document<Table>> for proto::Table {
    fn from(Document { id, body }: Document<Table>) -> Self {
        Self {
            id: id.to_string(),
            number: int32(body.number),
            capacity: int32(body.capacity),
            reserved: body.reserved,
            updated_at: body.updated_at.map(timestamp),
        }
    }
}

impl From<Vec<Document<Table>>> for proto::Tables {
    fn from(tables: Vec<Document<Table>>) -> Self {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<proto::CreateReservationRequest> for NewReservation {
    fn from(request: proto::CreateReservationRequest) -> Self {
        Self {
            user_id: request.user_id,
            table_id: request.table_id,
            date: request.reservation_date,
            time: request.reservation_time,
            guest_count: request.guest_count,
            status: request.status,
        }
    }
}

impl proto::UpdateReservationRequest {
    /// Splits the request into the target id and the requested changes.
    pub fn into_parts(self) -> (String, ReservationChanges) {
        let changes = ReservationChanges {
            table_id: self.table_id,
            date: self.reservation_date,
            guest_count: self.guest_count,
            status: self.status,
        };
        (self.id, changes)
    }
}

impl From<proto::CreateTableRequest> for NewTable {
    fn from(request: proto::CreateTableRequest) -> Self {
        Self {
            number: request.number,
            capacity: request.capacity,
            reserved: request.reserved,
        }
    }
}

impl proto::UpdateTableRequest {
    pub fn into_parts(self) -> (String, TableChanges) {
        let changes = TableChanges {
            capacity: self.capacity,
            reserved: self.reserved,
        };
        (self.id, changes)
    }
}

impl proto::Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
            id: String::new(),
        }
    }

    pub fn created(message: impl Into<String>, id: DocumentId) -> Self {
        Self {
            id: id.to_string(),
            ..Self::ok(message)
        }
    }

    /// A write that was refused without side effects.
    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            id: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReservationStatus;
    use chrono::TimeZone;

    #[test]
    fn reservation_document_to_message() {
        let id = DocumentId::generate();
        let created_at = Utc.with_ymd_and_hms(2023, 1, 1, 9, 30, 0).unwrap();
        let message = proto::Reservation::from(Document::new(
            id,
            Reservation {
                user_id: "user1".into(),
                table_id: "t1".into(),
                date: "01-01-2023".into(),
                time: "12:00".into(),
                guest_count: 2,
                status: ReservationStatus::Cancelled,
                created_at,
                updated_at: None,
            },
        ));

        assert_eq!(message.id, id.to_string());
        assert_eq!(message.reservation_date, "01-01-2023");
        assert_eq!(message.reservation_time, "12:00");
        assert_eq!(message.guest_count, 2);
        assert_eq!(message.status, "cancelled");
        assert_eq!(message.created_at, "2023-01-01T09:30:00.000Z");
        assert_eq!(message.updated_at, None);
    }

    #[test]
    fn update_request_keeps_absent_fields_absent() {
        let (id, changes) = proto::UpdateReservationRequest {
            id: "abc".into(),
            table_id: None,
            reservation_date: None,
            guest_count: Some(4),
            status: None,
        }
        .into_parts();

        assert_eq!(id, "abc");
        assert_eq!(
            changes,
            ReservationChanges {
                guest_count: Some(4),
                ..Default::default()
            }
        );
    }

    #[test]
    fn responses() {
        let id = DocumentId::generate();
        let created = proto::Response::created("Table created successfully", id);
        assert!(created.success);
        assert_eq!(created.id, id.to_string());

        let refused = proto::Response::refused("taken");
        assert!(!refused.success);
        assert!(refused.id.is_empty());
    }
}
