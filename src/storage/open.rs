use std::cmp;

use crate::error::{Error, Result};
use crate::key;
use crate::storage::HashTable;

/// A fixed-capacity table resolving collisions by linear probing.
///
/// `indices[i]` holds the key occupying slot `i` and `slots[i]` its value; both are `None` for an
/// empty slot. Deletion clears a slot in place without leaving a tombstone.
///
/// Insertion and deletion probe no further than `probe_limit` (inclusive) while search probes up
/// to the end of the table. The two bounds differ whenever a node's range does not end at the last
/// slot of the table.
#[derive(Clone, Debug, Default)]
pub struct OpenTable {
    size: usize,
    probe_limit: usize,
    indices: Vec<Option<String>>,
    slots: Vec<Option<String>>,
}

impl OpenTable {
    /// Constructs a configured `OpenTable`.
    pub fn new(size: usize, probe_limit: usize) -> Self {
        let mut table = OpenTable::default();
        table.configure(size, probe_limit);
        table
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.indices.iter().filter(|index| index.is_some()).count()
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slot currently holding `key`, if any.
    pub fn position(&self, key: &str) -> Option<usize> {
        if self.size == 0 {
            return None;
        }
        let start = self.hash(key);
        (start..self.size).find(|&i| self.holds(i, key))
    }

    fn holds(&self, index: usize, key: &str) -> bool {
        self.indices[index].as_deref() == Some(key)
    }

    /// Last slot insertion and deletion may probe.
    fn probe_end(&self) -> usize {
        cmp::min(self.probe_limit, self.size - 1)
    }

    fn occupy(&mut self, index: usize, key: &str, value: &str) {
        self.indices[index] = Some(key.to_string());
        self.slots[index] = Some(value.to_string());
    }

    fn clear(&mut self, index: usize) {
        self.indices[index] = None;
        self.slots[index] = None;
    }
}

impl HashTable for OpenTable {
    fn configure(&mut self, size: usize, probe_limit: usize) {
        self.size = size;
        self.probe_limit = probe_limit;
        self.indices = vec![None; size];
        self.slots = vec![None; size];
    }

    fn hash(&self, key: &str) -> usize {
        key::bucket(key, self.size)
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        if self.size == 0 {
            return Err(Error::TableFull(key.to_string()));
        }
        let bucket = self.hash(key);
        if self.indices[bucket].is_none() {
            self.occupy(bucket, key, value);
            return Ok(());
        }
        if self.holds(bucket, key) {
            return Err(Error::DuplicateKey(key.to_string()));
        }

        // the first empty slot ends the probe, so a copy stored past a hole goes unseen
        for i in (bucket + 1)..=self.probe_end() {
            if self.holds(i, key) {
                return Err(Error::DuplicateKey(key.to_string()));
            }
            if self.indices[i].is_none() {
                debug!("Probed {:?} from slot {} to {}", key, bucket, i);
                self.occupy(i, key, value);
                return Ok(());
            }
        }
        Err(Error::TableFull(key.to_string()))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.size == 0 {
            return Err(Error::NotFound(key.to_string()));
        }
        let bucket = self.hash(key);
        if self.holds(bucket, key) {
            self.clear(bucket);
            return Ok(());
        }

        match ((bucket + 1)..=self.probe_end()).find(|&i| self.holds(i, key)) {
            Some(i) => {
                self.clear(i);
                Ok(())
            },
            None => Err(Error::NotFound(key.to_string())),
        }
    }

    fn search(&self, key: &str) -> Result<String> {
        self.position(key)
            .and_then(|i| self.slots[i].clone())
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }
}
