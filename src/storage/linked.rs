use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::key;
use crate::storage::HashTable;

/// A table whose slots each own an ordered map keyed by the original key.
///
/// Colliding keys share a slot's map, so no probing happens and inserting an existing key
/// overwrites its value.
#[derive(Clone, Debug, Default)]
pub struct LinkedTable {
    slots: Vec<BTreeMap<String, String>>,
}

impl LinkedTable {
    /// Constructs a configured `LinkedTable`.
    pub fn new(size: usize) -> Self {
        let mut table = LinkedTable::default();
        table.configure(size, size);
        table
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.slots.iter().map(BTreeMap::len).sum()
    }

    /// Returns `true` if no key is stored.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(BTreeMap::is_empty)
    }
}

impl HashTable for LinkedTable {
    fn configure(&mut self, size: usize, _probe_limit: usize) {
        self.slots = vec![BTreeMap::new(); size];
    }

    fn hash(&self, key: &str) -> usize {
        key::bucket(key, self.slots.len())
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        if self.slots.is_empty() {
            return Err(Error::TableFull(key.to_string()));
        }
        let index = self.hash(key);
        self.slots[index].insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.slots.is_empty() {
            return Err(Error::NotFound(key.to_string()));
        }
        let index = self.hash(key);
        self.slots[index]
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    fn search(&self, key: &str) -> Result<String> {
        if self.slots.is_empty() {
            return Err(Error::NotFound(key.to_string()));
        }
        self.slots[self.hash(key)]
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }
}
