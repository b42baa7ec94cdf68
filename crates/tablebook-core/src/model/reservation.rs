use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 3] = [
        ReservationStatus::Confirmed,
        ReservationStatus::Cancelled,
        ReservationStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    /// Whether moving a reservation into this status frees its table.
    pub fn releases_table(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Cancelled | ReservationStatus::Completed
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}

/// One bookable period: a table on a date at an hour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub table_id: String,
    pub date: String,
    pub time: String,
}

impl Slot {
    pub fn new(
        table_id: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            date: date.into(),
            time: time.into(),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {} on {} at {}", self.table_id, self.date, self.time)
    }
}

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(rename = "tableid")]
    pub table_id: String,
    /// `dd-mm-yyyy`
    #[serde(rename = "reservationdate")]
    pub date: String,
    /// `HH:00`
    #[serde(rename = "reservationtime")]
    pub time: String,
    #[serde(rename = "guestcount")]
    pub guest_count: u32,
    pub status: ReservationStatus,
    #[serde(rename = "createat")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updateat", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn slot(&self) -> Slot {
        Slot::new(&self.table_id, &self.date, &self.time)
    }
}

/// A reservation as requested by a client, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewReservation {
    pub user_id: String,
    pub table_id: String,
    pub date: String,
    pub time: String,
    pub guest_count: i32,
    pub status: String,
}

impl NewReservation {
    pub fn slot(&self) -> Slot {
        Slot::new(&self.table_id, &self.date, &self.time)
    }
}

/// Fields a client asked to change on a reservation. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationChanges {
    pub table_id: Option<String>,
    pub date: Option<String>,
    pub guest_count: Option<i32>,
    pub status: Option<String>,
}

/// A validated partial update of a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationPatch {
    pub table_id: Option<String>,
    pub date: Option<String>,
    pub guest_count: Option<u32>,
    pub status: Option<ReservationStatus>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationPatch {
    /// Writes the supplied fields into `reservation` and stamps the update
    /// time.
    pub fn apply(&self, reservation: &mut Reservation) {
        if let Some(table_id) = &self.table_id {
            reservation.table_id.clone_from(table_id);
        }
        if let Some(date) = &self.date {
            reservation.date.clone_from(date);
        }
        if let Some(guest_count) = self.guest_count {
            reservation.guest_count = guest_count;
        }
        if let Some(status) = self.status {
            reservation.status = status;
        }
        reservation.updated_at = Some(self.updated_at);
    }

    /// Whether this patch moves the reservation into a status that frees its
    /// table.
    pub fn releases_table(&self) -> bool {
        self.status.is_some_and(|status| status.releases_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation() -> Reservation {
        Reservation {
            user_id: "user1".into(),
            table_id: "table1".into(),
            date: "01-01-2023".into(),
            time: "12:00".into(),
            guest_count: 2,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn status_parses_known_values() {
        for status in ReservationStatus::ALL {
            assert_eq!(status.as_str().parse::<ReservationStatus>(), Ok(status));
        }
        assert_eq!(
            "confirmada".parse::<ReservationStatus>(),
            Err(ValidationError::InvalidStatus("confirmada".into()))
        );
    }

    #[test]
    fn only_terminal_statuses_release_the_table() {
        assert!(!ReservationStatus::Confirmed.releases_table());
        assert!(ReservationStatus::Cancelled.releases_table());
        assert!(ReservationStatus::Completed.releases_table());
    }

    #[test]
    fn document_keys_are_stable() {
        let value = serde_json::to_value(reservation()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "createat",
                "guestcount",
                "reservationdate",
                "reservationtime",
                "status",
                "tableid",
                "userid"
            ]
        );
        assert_eq!(value["status"], "confirmed");
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut r = reservation();
        let now = Utc::now();
        let patch = ReservationPatch {
            table_id: None,
            date: Some("02-01-2023".into()),
            guest_count: None,
            status: Some(ReservationStatus::Completed),
            updated_at: now,
        };
        patch.apply(&mut r);

        assert_eq!(r.table_id, "table1");
        assert_eq!(r.date, "02-01-2023");
        assert_eq!(r.guest_count, 2);
        assert_eq!(r.status, ReservationStatus::Completed);
        assert_eq!(r.updated_at, Some(now));
        assert!(patch.releases_table());
    }
}
