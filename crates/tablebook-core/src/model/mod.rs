//! # Reservation and table records
//!
//! The model separates three shapes for each resource:
//!
//! - the raw request (`NewReservation`, `ReservationChanges`, `NewTable`,
//!   `TableChanges`) exactly as a client supplied it;
//! - the validated patch (`ReservationPatch`, `TablePatch`) that a store
//!   applies to an existing document;
//! - the stored record (`Reservation`, `Table`), wrapped in a [`Document`]
//!   once the store has assigned it an identifier.
//!
//! Field names of the stored records are part of the persistence contract:
//! serde renames pin them to the document keys used by every backend.

mod reservation;
mod table;

pub use reservation::*;
pub use table::*;

use crate::types::DocumentId;
use serde::{Deserialize, Serialize};

/// A stored record together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<T> {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Document<T> {
    pub fn new(id: DocumentId, body: T) -> Self {
        Self { id, body }
    }
}
