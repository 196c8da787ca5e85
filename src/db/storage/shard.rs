//! Shard is an independently locked partition of the key space.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::RwLock;

/// Shard owns the entries of one partition behind a single `RwLock`.
///
/// Lookups take the shared lock and run in parallel. Inserts and removals take
/// the exclusive lock for exactly one hash-table operation, so writers to keys
/// of the same shard queue behind each other only for that long. Keys living in
/// different shards never contend.
pub struct Shard<V> {
    id: usize,
    items: RwLock<HashMap<String, V>>,
}

impl<V: Clone> Shard<V> {
    /// Creates a new empty shard.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Gets the shard ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Checks whether the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.items.read().contains_key(key)
    }

    /// Gets a copy of the value stored for the key.
    pub fn get(&self, key: &str) -> Option<V> {
        self.items.read().get(key).cloned()
    }

    /// Stores the value only if the key is absent.
    ///
    /// The presence check and the insert happen under one write guard. On
    /// conflict the map is left untouched and the present value is returned.
    pub fn insert_if_absent(&self, key: &str, value: V) -> Result<(), V> {
        let mut items = self.items.write();
        match items.entry(key.to_string()) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    /// Stores the value only if the key is absent. Returns false on conflict.
    ///
    /// Same check-and-set as `insert_if_absent`, without copying the present
    /// value out on conflict.
    pub fn insert_new(&self, key: &str, value: V) -> bool {
        let mut items = self.items.write();
        match items.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Removes the key. Returns false if it was not present.
    pub fn remove(&self, key: &str) -> bool {
        self.items.write().remove(key).is_some()
    }

    /// Gets the number of entries.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
