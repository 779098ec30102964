//! KeyTable: default entry store with stable slots and tombstones.
//!
//! Slots live in a `SlotMap` and are indexed by a `HashTable` over the
//! precomputed hash of their key. Removal marks the slot as a tombstone
//! instead of unlinking it, so remove/re-add cycles on the same key reuse
//! the slot without touching the index. `compact` drops pending
//! tombstones, and `discard` runs it once tombstones reach
//! `COMPACT_MIN_TOMBSTONES` and outnumber live entries, so the slot count
//! stays within a constant factor of the live count.

use crate::key::Key;
use crate::store::EntryStore;
use core::hash::BuildHasher;
use core::marker::PhantomData;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Tombstone count below which `discard` never compacts.
pub const COMPACT_MIN_TOMBSTONES: usize = 64;

#[derive(Clone, Debug)]
enum State<E> {
    Live(E),
    Tombstone,
}

#[derive(Clone, Debug)]
struct Slot<E> {
    key: Key,
    hash: u64,
    state: State<E>,
}

pub struct KeyTable<E, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Slot<E>>,
    live: usize,
    // Single-threaded like the rest of the crate.
    _nosend: PhantomData<*mut ()>,
}

impl<E> KeyTable<E> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<E> Default for KeyTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over every occupied slot's key, live or tombstoned.
pub struct Keys<'a, E> {
    it: slotmap::basic::Values<'a, DefaultKey, Slot<E>>,
}

impl<'a, E> Iterator for Keys<'a, E> {
    type Item = &'a Key;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|s| &s.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<E, S> KeyTable<E, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            live: 0,
            _nosend: PhantomData,
        }
    }

    fn make_hash(&self, key: &str) -> u64 {
        self.hasher.hash_one(key)
    }

    fn find(&self, key: &str) -> Option<DefaultKey> {
        let hash = self.make_hash(key);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|s| s.key.as_str() == key)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots whose entry has been removed but not yet compacted.
    pub fn tombstones(&self) -> usize {
        self.slots.len() - self.live
    }

    /// Unlink every tombstoned slot from the index and free it.
    pub fn compact(&mut self) {
        let dead: Vec<(DefaultKey, u64)> = self
            .slots
            .iter()
            .filter(|(_, s)| matches!(s.state, State::Tombstone))
            .map(|(k, s)| (k, s.hash))
            .collect();
        if dead.is_empty() {
            return;
        }
        for (k, hash) in &dead {
            if let Ok(entry) = self.index.find_entry(*hash, |&kk| kk == *k) {
                entry.remove();
            }
            self.slots.remove(*k);
        }
        log::debug!("compacted {} tombstoned slots", dead.len());
    }
}

impl<E, S> EntryStore<E> for KeyTable<E, S>
where
    S: BuildHasher + Clone,
{
    type Keys<'a>
        = Keys<'a, E>
    where
        Self: 'a,
        E: 'a;

    fn exists(&self, key: &Key) -> bool {
        self.find(key.as_str())
            .and_then(|k| self.slots.get(k))
            .map(|s| matches!(s.state, State::Live(_)))
            .unwrap_or(false)
    }

    fn store(&mut self, key: Key, value: E) {
        if let Some(k) = self.find(key.as_str()) {
            // Revive a tombstone (or overwrite, if the caller skipped `exists`).
            if let Some(slot) = self.slots.get_mut(k) {
                if matches!(slot.state, State::Tombstone) {
                    self.live += 1;
                }
                slot.state = State::Live(value);
                return;
            }
        }
        let hash = self.make_hash(key.as_str());
        let k = self.slots.insert(Slot {
            key,
            hash,
            state: State::Live(value),
        });
        let slots = &self.slots;
        self.index.insert_unique(hash, k, |&kk| {
            slots.get(kk).map(|s| s.hash).unwrap_or(0)
        });
        self.live += 1;
    }

    fn load(&self, key: &Key) -> Option<&E> {
        let k = self.find(key.as_str())?;
        match &self.slots.get(k)?.state {
            State::Live(v) => Some(v),
            State::Tombstone => None,
        }
    }

    fn discard(&mut self, key: &Key) -> Option<E> {
        let k = self.find(key.as_str())?;
        let slot = self.slots.get_mut(k)?;
        match core::mem::replace(&mut slot.state, State::Tombstone) {
            State::Live(v) => {
                self.live -= 1;
                let dead = self.tombstones();
                if dead >= COMPACT_MIN_TOMBSTONES && dead > self.live {
                    self.compact();
                }
                Some(v)
            }
            State::Tombstone => None,
        }
    }

    fn len(&self) -> usize {
        self.live
    }

    fn keys(&self) -> Self::Keys<'_> {
        Keys {
            it: self.slots.values(),
        }
    }

    // Slots already carry their state; no index lookups needed.
    fn walk<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        for slot in self.slots.values() {
            if let State::Live(v) = &slot.state {
                if !f(v) {
                    return false;
                }
            }
        }
        true
    }

    fn reset(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.live = 0;
    }

    fn fresh(&self) -> Self {
        Self::with_hasher(self.hasher.clone())
    }
}
