use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored dining table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub number: u32,
    pub capacity: u32,
    /// Denormalized "an active reservation references this table" flag.
    #[serde(rename = "isreserved")]
    pub reserved: bool,
    #[serde(rename = "updateat", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A table as requested by a client, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTable {
    pub number: i32,
    pub capacity: i32,
    pub reserved: bool,
}

/// Fields a client asked to change on a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableChanges {
    pub capacity: Option<i32>,
    pub reserved: Option<bool>,
}

/// A validated partial update of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePatch {
    pub capacity: Option<u32>,
    pub reserved: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl TablePatch {
    /// A patch that only sets the reserved flag.
    pub fn reserved(reserved: bool, updated_at: DateTime<Utc>) -> Self {
        Self {
            capacity: None,
            reserved: Some(reserved),
            updated_at,
        }
    }

    pub fn apply(&self, table: &mut Table) {
        if let Some(capacity) = self.capacity {
            table.capacity = capacity;
        }
        if let Some(reserved) = self.reserved {
            table.reserved = reserved;
        }
        table.updated_at = Some(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keys_are_stable() {
        let table = Table {
            number: 5,
            capacity: 4,
            reserved: false,
            updated_at: None,
        };
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "number": 5, "capacity": 4, "isreserved": false })
        );
    }

    #[test]
    fn reserved_patch_keeps_capacity() {
        let mut table = Table {
            number: 1,
            capacity: 6,
            reserved: false,
            updated_at: None,
        };
        let now = Utc::now();
        TablePatch::reserved(true, now).apply(&mut table);
        assert_eq!(table.capacity, 6);
        assert!(table.reserved);
        assert_eq!(table.updated_at, Some(now));
    }
}
