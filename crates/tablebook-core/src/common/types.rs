//! # Document identifiers and collection names
//!
//! Every record in the document store is addressed by a [`DocumentId`]
//! assigned by the store at insert time. On the wire and in the stored
//! documents the identifier is the hyphenated UUID string; anything else is a
//! malformed identifier and is rejected before the store is touched.

use crate::Error;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the reservation collection.
pub const RESERVATIONS: &str = "reservations";

/// Name of the dining table collection.
pub const TABLES: &str = "tables";

/// Store-assigned identifier of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier received from a client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedId`] if `raw` is not a UUID.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| Error::MalformedId {
                id: raw.to_string(),
            })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let id = DocumentId::generate();
        let parsed = DocumentId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_object_id_hex() {
        let err = DocumentId::parse("60d5ec49f1d2c2a1d4e8b0c8").unwrap_err();
        assert!(matches!(err, Error::MalformedId { id } if id == "60d5ec49f1d2c2a1d4e8b0c8"));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(
            DocumentId::parse(""),
            Err(Error::MalformedId { .. })
        ));
    }
}
