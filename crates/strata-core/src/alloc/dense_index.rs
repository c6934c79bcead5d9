//! Dense slot assignment keyed by identity.
//!
//! A [`DenseIndex`] maps arbitrary hashable keys to the integers `0, 1, 2, ...`
//! in the order the keys are first seen. Lookups of a known key always return
//! the same slot until [`DenseIndex::clear`] is called.

use std::hash::Hash;

use crate::profiling::profile_function;

use super::HashMap;

#[derive(Debug, Clone)]
pub struct DenseIndex<K> {
    slots: HashMap<K, u32>,
}

impl<K: Eq + Hash> DenseIndex<K> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the slot of `key`, assigning the next free slot on first lookup.
    pub fn slot_of(&mut self, key: K) -> u32 {
        profile_function!();
        let next = self.slots.len() as u32;
        *self.slots.entry(key).or_insert(next)
    }

    /// Returns the slot of `key` without assigning one.
    pub fn get(&self, key: &K) -> Option<u32> {
        self.slots.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of distinct keys seen since the last clear.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Forgets every assignment. Capacity is retained.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<K: Eq + Hash> Default for DenseIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
