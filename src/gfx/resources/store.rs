//! Per-kind resource storage
//!
//! Each resource kind lives in a [`SlotMap`] keyed by its own key type. The
//! ids handed out pair the slot key with the store that issued it, so an id
//! from another scene never resolves here even when its slot is occupied.
//! The id doubles as the identity the renderer compares to skip redundant
//! binds.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{new_key_type, Key, SlotMap};

new_key_type! {
    pub struct GeometryKey;
    pub struct MaterialKey;
    pub struct GroupKey;
}

static NEXT_STORE: AtomicU64 = AtomicU64::new(1);

/// Identity of one [`ResourceStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

impl StoreId {
    fn next() -> Self {
        Self(NEXT_STORE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Slot key tagged with the store that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId<K> {
    store: StoreId,
    key: K,
}

impl<K: Key> ResourceId<K> {
    pub fn key(self) -> K {
        self.key
    }
}

/// Slot map that only answers to ids it issued
#[derive(Debug)]
pub struct ResourceStore<K: Key, V> {
    id: StoreId,
    slots: SlotMap<K, V>,
}

impl<K: Key, V> ResourceStore<K, V> {
    pub fn new() -> Self {
        Self {
            id: StoreId::next(),
            slots: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, value: V) -> ResourceId<K> {
        ResourceId {
            store: self.id,
            key: self.slots.insert(value),
        }
    }

    pub fn get(&self, id: ResourceId<K>) -> Option<&V> {
        if id.store == self.id {
            self.slots.get(id.key)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: ResourceId<K>) -> Option<&mut V> {
        if id.store == self.id {
            self.slots.get_mut(id.key)
        } else {
            None
        }
    }

    pub fn contains(&self, id: ResourceId<K>) -> bool {
        id.store == self.id && self.slots.contains_key(id.key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Key, V> Default for ResourceStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_and_stable() {
        let mut store: ResourceStore<GeometryKey, &str> = ResourceStore::new();
        let a = store.insert("cube");
        let b = store.insert("chair");

        assert_ne!(a, b);
        assert_eq!(store.get(a), Some(&"cube"));
        assert_eq!(store.get(b), Some(&"chair"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_id_from_another_store_misses_occupied_slot() {
        let mut theirs: ResourceStore<MaterialKey, i32> = ResourceStore::new();
        let foreign = theirs.insert(1);

        let mut ours: ResourceStore<MaterialKey, i32> = ResourceStore::new();
        let own = ours.insert(2);
        assert_eq!(own.key(), foreign.key());

        assert!(!ours.contains(foreign));
        assert!(ours.get(foreign).is_none());
        assert!(ours.get_mut(foreign).is_none());
        assert!(ours.contains(own));
    }
}
