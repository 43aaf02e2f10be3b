//! Dense, ID-indexed entity storage with generational handles
//!
//! Entities of one type live contiguously in a `Vec`, so their dense IDs are
//! always exactly `0..len`. Removal moves the last entity into the freed
//! position. Each entity also owns a slotmap key that survives those moves
//! and goes stale once the entity is removed.

use slotmap::{Key, SlotMap};

#[derive(Debug, Clone)]
pub struct Arena<K: Key, T> {
    /// Key -> current dense position
    slots: SlotMap<K, usize>,
    entries: Vec<(K, T)>,
}

impl<K: Key, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            slots: SlotMap::with_key(),
            entries: Vec::new(),
        }
    }
}

impl<K: Key, T> Arena<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entity. Its dense ID is the previous length.
    pub fn insert(&mut self, value: T) -> K {
        let id = self.entries.len();
        let key = self.slots.insert(id);
        self.entries.push((key, value));
        key
    }

    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    /// Current dense ID of a live entity.
    pub fn id_of(&self, key: K) -> Option<usize> {
        self.slots.get(key).copied()
    }

    /// Key of the entity currently stored at `id`.
    pub fn key_at(&self, id: usize) -> Option<K> {
        self.entries.get(id).map(|(key, _)| *key)
    }

    pub fn get(&self, key: K) -> Option<&T> {
        let id = self.id_of(key)?;
        self.entries.get(id).map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let id = self.id_of(key)?;
        self.entries.get_mut(id).map(|(_, value)| value)
    }

    pub fn get_by_id(&self, id: usize) -> Option<&T> {
        self.entries.get(id).map(|(_, value)| value)
    }

    /// Remove an entity and compact: the last entity takes over its ID.
    /// Returns `None` for a stale key.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let id = self.slots.remove(key)?;
        let (_, value) = self.entries.swap_remove(id);
        self.reindex(id);
        Some(value)
    }

    /// Re-point the key of whatever entity now sits at `id` to that
    /// position, returning it. Positions past the end are a no-op, which
    /// is the case after removing the entity that was already last.
    pub fn reindex(&mut self, id: usize) -> Option<K> {
        let key = self.key_at(id)?;
        if let Some(slot) = self.slots.get_mut(key) {
            *slot = id;
        }
        Some(key)
    }

    /// Entities in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, K, &T)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, (key, value))| (id, *key, value))
    }

    /// Keys in ID order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Whether the key table and the dense storage agree.
    pub fn is_consistent(&self) -> bool {
        self.slots.len() == self.entries.len()
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(id, (key, _))| self.slots.get(*key) == Some(&id))
    }
}
