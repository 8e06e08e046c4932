pub mod linked;
pub mod open;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::storage::linked::LinkedTable;
use crate::storage::open::OpenTable;

/// The capability set shared by every storage backend of a node.
///
/// A backend is configured once with the global table size and a probe limit, and afterwards
/// only its contents change.
pub trait HashTable: Send {
    /// Allocates `size` slots. `probe_limit` bounds how far collision resolution may search.
    fn configure(&mut self, size: usize, probe_limit: usize);

    /// Returns the slot index of `key`.
    fn hash(&self, key: &str) -> usize;

    /// Stores `value` under `key`.
    fn insert(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` and its value.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Returns the value stored under `key`.
    fn search(&self, key: &str) -> Result<String>;
}

/// Selects which backend a node is constructed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    /// Fixed slots with linear probing.
    Open,
    /// One ordered map per slot.
    Linked,
}

impl StorageKind {
    /// Constructs and configures a backend of this kind.
    pub fn build(self, size: usize, probe_limit: usize) -> Box<dyn HashTable> {
        let mut table: Box<dyn HashTable> = match self {
            StorageKind::Open => Box::new(OpenTable::default()),
            StorageKind::Linked => Box::new(LinkedTable::default()),
        };
        table.configure(size, probe_limit);
        table
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(StorageKind::Open),
            "linked" => Ok(StorageKind::Linked),
            other => Err(format!("unknown storage kind {:?}, expected `open` or `linked`", other)),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StorageKind::Open => write!(f, "open"),
            StorageKind::Linked => write!(f, "linked"),
        }
    }
}
