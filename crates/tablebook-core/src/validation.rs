//! # Field validation
//!
//! Pure checks applied to client input before anything is written. Each
//! function runs its checks in a fixed order and returns the first failure;
//! errors are never aggregated.
//!
//! Reservation checks, in order:
//!
//! 1. user id present
//! 2. table id present
//! 3. date present
//! 4. time present
//! 5. guest count non-zero, then positive
//! 6. status present, then one of `confirmed`, `cancelled`, `completed`
//! 7. date is `dd-mm-yyyy` and a real calendar day
//! 8. time is `HH:MM`
//! 9. time falls on the hour
//!
//! Successful validation converts the raw request into the typed record or
//! patch, so callers never hold an unchecked value past this point.

use crate::model::{
    NewReservation, NewTable, Reservation, ReservationChanges, ReservationPatch,
    ReservationStatus, Table, TableChanges, TablePatch,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

/// `dd-mm-yyyy`
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// `HH:MM`
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("userID is required")]
    MissingUserId,
    #[error("tableID is required")]
    MissingTableId,
    #[error("reservationDate is required")]
    MissingDate,
    #[error("reservationTime is required")]
    MissingTime,
    #[error("guestCount is required")]
    MissingGuestCount,
    #[error("guestCount must be greater than 0")]
    NonPositiveGuestCount,
    #[error("status is required")]
    MissingStatus,
    #[error("invalid status {0:?}, expected one of: confirmed, cancelled, completed")]
    InvalidStatus(String),
    #[error("invalid date format, expected dd-mm-yyyy")]
    InvalidDate,
    #[error("invalid time format, expected HH:MM")]
    InvalidTime,
    #[error("reservation time must end in :00")]
    TimeNotOnTheHour,
    #[error("number and capacity are required")]
    MissingTableDimensions,
    #[error("number and capacity must be greater than 0")]
    NonPositiveTableDimensions,
    #[error("capacity must be greater than 0")]
    NonPositiveCapacity,
}

/// Validates a reservation request and builds the record to insert.
///
/// `created_at` is the server-assigned creation time.
pub fn validate_reservation(
    request: &NewReservation,
    created_at: DateTime<Utc>,
) -> Result<Reservation, ValidationError> {
    if request.user_id.is_empty() {
        return Err(ValidationError::MissingUserId);
    }
    if request.table_id.is_empty() {
        return Err(ValidationError::MissingTableId);
    }
    if request.date.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    if request.time.is_empty() {
        return Err(ValidationError::MissingTime);
    }
    let guest_count = check_guest_count(request.guest_count)?;
    let status = check_status(&request.status)?;
    check_date(&request.date)?;
    check_time(&request.time)?;

    Ok(Reservation {
        user_id: request.user_id.clone(),
        table_id: request.table_id.clone(),
        date: request.date.clone(),
        time: request.time.clone(),
        guest_count,
        status,
        created_at,
        updated_at: None,
    })
}

/// Validates the supplied fields of a reservation update.
///
/// A supplied field must satisfy the same rule it does on creation; an
/// explicitly empty string counts as missing rather than absent.
pub fn validate_changes(
    changes: ReservationChanges,
    updated_at: DateTime<Utc>,
) -> Result<ReservationPatch, ValidationError> {
    if changes.table_id.as_deref() == Some("") {
        return Err(ValidationError::MissingTableId);
    }
    if let Some(date) = changes.date.as_deref() {
        if date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        check_date(date)?;
    }
    let guest_count = changes.guest_count.map(check_guest_count).transpose()?;
    let status = changes.status.as_deref().map(check_status).transpose()?;

    Ok(ReservationPatch {
        table_id: changes.table_id,
        date: changes.date,
        guest_count,
        status,
        updated_at,
    })
}

/// Validates a table request and builds the record to insert.
pub fn validate_table(request: &NewTable) -> Result<Table, ValidationError> {
    if request.number == 0 || request.capacity == 0 {
        return Err(ValidationError::MissingTableDimensions);
    }
    match (
        u32::try_from(request.number),
        u32::try_from(request.capacity),
    ) {
        (Ok(number), Ok(capacity)) => Ok(Table {
            number,
            capacity,
            reserved: request.reserved,
            updated_at: None,
        }),
        _ => Err(ValidationError::NonPositiveTableDimensions),
    }
}

/// Validates the supplied fields of a table update.
pub fn validate_table_changes(
    changes: TableChanges,
    updated_at: DateTime<Utc>,
) -> Result<TablePatch, ValidationError> {
    let capacity = changes
        .capacity
        .map(|capacity| match u32::try_from(capacity) {
            Ok(capacity) if capacity > 0 => Ok(capacity),
            _ => Err(ValidationError::NonPositiveCapacity),
        })
        .transpose()?;

    Ok(TablePatch {
        capacity,
        reserved: changes.reserved,
        updated_at,
    })
}

/// Checks that `date` is exactly `dd-mm-yyyy` and names a real day.
pub fn check_date(date: &str) -> Result<(), ValidationError> {
    if !has_shape(date, &[2, 5], b'-', 10) || NaiveDate::parse_from_str(date, DATE_FORMAT).is_err()
    {
        return Err(ValidationError::InvalidDate);
    }
    Ok(())
}

/// Checks that `time` is exactly `HH:MM` and falls on the hour.
pub fn check_time(time: &str) -> Result<(), ValidationError> {
    if !has_shape(time, &[2], b':', 5) {
        return Err(ValidationError::InvalidTime);
    }
    let parsed =
        NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| ValidationError::InvalidTime)?;
    if parsed.minute() != 0 {
        return Err(ValidationError::TimeNotOnTheHour);
    }
    Ok(())
}

fn check_guest_count(guest_count: i32) -> Result<u32, ValidationError> {
    match guest_count {
        0 => Err(ValidationError::MissingGuestCount),
        n => u32::try_from(n).map_err(|_| ValidationError::NonPositiveGuestCount),
    }
}

fn check_status(status: &str) -> Result<ReservationStatus, ValidationError> {
    if status.is_empty() {
        return Err(ValidationError::MissingStatus);
    }
    status.parse()
}

// Fixed-width digits with `sep` at each of `positions`.
fn has_shape(value: &str, positions: &[usize], sep: u8, len: usize) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == len
        && bytes.iter().enumerate().all(|(i, b)| {
            if positions.contains(&i) {
                *b == sep
            } else {
                b.is_ascii_digit()
            }
        })
}
