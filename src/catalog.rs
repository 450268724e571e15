//! File directory: id-keyed records of committed files
//!
//! Maps file ids to their directory records and owns id assignment. Ids are
//! monotonic and never recycled; deleting a file retires its id for good,
//! and only an overwrite keeps an id alive across a new extent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest id handed out to files. Smaller ids are reserved for system use.
pub const FIRST_FILE_ID: u64 = 3;

/// File identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directory entry for one committed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,

    /// Canonical absolute path.
    pub path: String,

    /// Extent length in blocks.
    pub block_count: u64,

    /// Committed size in the block unit. Always a whole number of blocks.
    pub logical_size: u64,
}

/// Id-keyed file directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    records: BTreeMap<FileId, FileRecord>,
    next_id: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            records: BTreeMap::new(),
            next_id: FIRST_FILE_ID,
        }
    }

    /// Id the next fresh commit will receive. Only a successful commit
    /// consumes it: failed writes never burn ids.
    pub fn peek_next_id(&self) -> FileId {
        FileId(self.next_id)
    }

    /// Insert or replace a record. A record carrying the peeked fresh id
    /// advances the id sequence; overwrites of existing ids leave it alone.
    pub fn upsert(&mut self, record: FileRecord) {
        if record.id.0 >= self.next_id {
            self.next_id = record.id.0 + 1;
        }
        self.records.insert(record.id, record);
    }

    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.records.get(&id)
    }

    /// Look a file up by canonical path.
    pub fn find_by_path(&self, path: &str) -> Option<&FileRecord> {
        self.records.values().find(|record| record.path == path)
    }

    /// Remove a record. The id stays retired.
    pub fn remove(&mut self, id: FileId) -> Option<FileRecord> {
        self.records.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
