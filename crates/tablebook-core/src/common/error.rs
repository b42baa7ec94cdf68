//! Error types for the reservation service.
//!
//! This module defines the central `Error` enum, which captures every
//! reportable failure of the reservation and table operations. It implements
//! `From<Error>` for `tonic::Status` so handlers can propagate failures to
//! clients with `?` and an appropriate status code.
//!
//! ## Error Cases
//! - `Validation`: a field is missing, malformed, or outside its enumeration.
//!   Always detected before any write.
//! - `Conflict`: the (table, date, time) slot is already reserved.
//! - `NotFound`: a lookup, update, or delete addressed a missing document.
//! - `MalformedId`: an identifier could not be parsed into a [`DocumentId`].
//! - `Store`: the document store failed.
//! - `RolledBack`: the table flag write failed after the reservation insert,
//!   and the insert was undone.
//! - `Inconsistent`: the undo itself failed; the reservation is persisted but
//!   its table was never marked reserved.
//!
//! [`DocumentId`]: crate::types::DocumentId

use crate::model::Slot;
use crate::store::StoreError;
use crate::types::DocumentId;
use crate::validation::ValidationError;
use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the reservation service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The slot already holds a reservation.
    #[error("Reservation already exists for {slot}")]
    Conflict { slot: Slot },

    /// No document with this identifier exists in the collection.
    #[error("No document in `{collection}` with id {id}")]
    NotFound { collection: &'static str, id: String },

    /// The identifier is not a valid document id.
    #[error("Invalid id format: {id:?}")]
    MalformedId { id: String },

    /// The underlying document store failed.
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Marking the table reserved failed; the reservation insert was undone.
    #[error("Failed to reserve table {table_id}, reservation was not kept: {source}")]
    RolledBack {
        table_id: String,
        #[source]
        source: StoreError,
    },

    /// Undoing the reservation insert failed after the table flag write failed.
    #[error("Reservation {reservation_id} kept without reserving its table: {source}")]
    Inconsistent {
        reservation_id: DocumentId,
        #[source]
        source: StoreError,
    },
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => Error::NotFound { collection, id },
            StoreError::SlotTaken(slot) => Error::Conflict { slot },
            other => Error::Store(other),
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(e) => Status::invalid_argument(e.to_string()),
            Error::Conflict { slot } => {
                Status::already_exists(format!("Reservation already exists for {slot}"))
            }
            e @ Error::NotFound { .. } => Status::not_found(e.to_string()),
            e @ Error::MalformedId { .. } => Status::invalid_argument(e.to_string()),
            Error::Store(e) => Status::internal(format!("Store error: {e}")),
            e @ Error::RolledBack { .. } => Status::aborted(e.to_string()),
            e @ Error::Inconsistent { .. } => Status::internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn store_not_found_becomes_not_found() {
        let err = Error::from(StoreError::NotFound {
            collection: crate::types::RESERVATIONS,
            id: "abc".into(),
        });
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(Status::from(err).code(), Code::NotFound);
    }

    #[test]
    fn slot_taken_becomes_conflict() {
        let slot = Slot::new("t1", "01-01-2023", "12:00");
        let err = Error::from(StoreError::SlotTaken(slot.clone()));
        assert!(matches!(&err, Error::Conflict { slot: s } if *s == slot));
        assert_eq!(Status::from(err).code(), Code::AlreadyExists);
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            Status::from(Error::from(ValidationError::MissingUserId)).code(),
            Code::InvalidArgument
        );
        assert_eq!(
            Status::from(Error::MalformedId { id: "x".into() }).code(),
            Code::InvalidArgument
        );
        assert_eq!(
            Status::from(Error::RolledBack {
                table_id: "t".into(),
                source: StoreError::Unavailable("down".into()),
            })
            .code(),
            Code::Aborted
        );
        assert_eq!(
            Status::from(Error::Store(StoreError::Unavailable("down".into()))).code(),
            Code::Internal
        );
    }

    #[test]
    fn validation_message_is_passed_through() {
        let status = Status::from(Error::from(ValidationError::TimeNotOnTheHour));
        assert_eq!(status.message(), "reservation time must end in :00");
    }
}
