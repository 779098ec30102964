//! Raw storage primitives: steps 3 and 4 of the key-mapping pipeline.

use crate::key::Key;

/// Unchecked storage behind a `KeyedSet`.
///
/// `KeyedSet` only calls `store` after a negative `exists` check and
/// `load`/`discard` after a positive one; implementations need not
/// re-validate. Slots that were discarded may still be reported by
/// `keys` (tombstones) as long as `exists` returns false for them.
pub trait EntryStore<E> {
    type Keys<'a>: Iterator<Item = &'a Key>
    where
        Self: 'a,
        E: 'a;

    fn exists(&self, key: &Key) -> bool;
    fn store(&mut self, key: Key, value: E);
    fn load(&self, key: &Key) -> Option<&E>;
    fn discard(&mut self, key: &Key) -> Option<E>;

    /// Number of live entries. Tombstones are not counted.
    fn len(&self) -> usize;

    /// Every key currently occupying a slot, live or tombstoned, in a
    /// stable order for as long as the store is not mutated.
    fn keys(&self) -> Self::Keys<'_>;

    /// Visit each live entry until `f` returns false. Returns false if the
    /// walk was stopped.
    ///
    /// The provided walk checks `exists` before `load` for every key.
    /// Stores that can enumerate live entries directly should override it.
    fn walk<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        for key in self.keys() {
            if !self.exists(key) {
                continue;
            }
            if let Some(value) = self.load(key) {
                if !f(value) {
                    return false;
                }
            }
        }
        true
    }

    /// Drop all slots, tombstones included.
    fn reset(&mut self);

    /// An empty store with the same configuration (hasher, capacity hints).
    fn fresh(&self) -> Self
    where
        Self: Sized;
}
