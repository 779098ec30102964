//! KeyedSet: the key-mapping pipeline and the traversal engine.
//!
//! Every value-facing operation runs derive-key, then the acceptability
//! check, then the existence check, and stops at the first step that
//! fails. Only then are the raw store operations invoked. Everything
//! else in the crate is built on `for_each`.

use crate::error::AddError;
use crate::key::{Derived, IdKeys, Key, KeyPolicy};
use crate::key_table::KeyTable;
use crate::store::EntryStore;
use core::hash::BuildHasher;
use core::ops::ControlFlow;

/// Callback result accepted by `KeyedSet::for_each`.
///
/// `()` always continues, `false` stops, `ControlFlow::Break` stops.
pub trait Step {
    fn is_stop(self) -> bool;
}

impl Step for () {
    #[inline]
    fn is_stop(self) -> bool {
        false
    }
}

impl Step for bool {
    #[inline]
    fn is_stop(self) -> bool {
        !self
    }
}

impl<B, C> Step for ControlFlow<B, C> {
    #[inline]
    fn is_stop(self) -> bool {
        self.is_break()
    }
}

pub struct KeyedSet<E, P = IdKeys, T = KeyTable<E>> {
    policy: P,
    table: T,
    _pd: core::marker::PhantomData<E>,
}

impl<E, P, T> KeyedSet<E, P, T> {
    /// API version of the container type.
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    /// Build a set from an explicit policy and store. Entries already in
    /// the store are members of the set.
    pub fn with_parts(policy: P, table: T) -> Self {
        Self {
            policy,
            table,
            _pd: core::marker::PhantomData,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<E, P> KeyedSet<E, P>
where
    P: KeyPolicy<E> + Default,
{
    pub fn new() -> Self {
        Self::with_parts(P::default(), KeyTable::new())
    }
}

impl<E, P> Default for KeyedSet<E, P>
where
    P: KeyPolicy<E> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P, S> KeyedSet<E, P, KeyTable<E, S>>
where
    P: KeyPolicy<E>,
    S: BuildHasher + Clone,
{
    pub fn with_policy_and_hasher(policy: P, hasher: S) -> Self {
        Self::with_parts(policy, KeyTable::with_hasher(hasher))
    }

    /// Tombstoned slots awaiting compaction.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Free the slots of removed members.
    pub fn compact(&mut self) {
        self.table.compact();
    }
}

impl<E, P, S> KeyedSet<E, P, KeyTable<E, S>>
where
    P: KeyPolicy<E> + Default,
    S: BuildHasher + Clone,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_policy_and_hasher(P::default(), hasher)
    }
}

impl<E, P, T> KeyedSet<E, P, T>
where
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    /// Number of live members, as counted by the store.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Steps 1 and 2.
    fn accepted_key(&self, value: &E) -> Result<Key, AddError> {
        let derived = self.policy.derive_key(value);
        if !self.policy.is_acceptable(&derived) {
            return Err(match derived {
                Derived::Unsupported => AddError::Unsupported,
                Derived::Key(_) => AddError::Rejected,
            });
        }
        derived.into_key().ok_or(AddError::Unsupported)
    }

    /// Store `value` unless it is unsupported, rejected, or already present.
    /// A present member keeps its original stored instance.
    pub fn try_add(&mut self, value: E) -> Result<(), AddError> {
        let key = self.accepted_key(&value).inspect_err(|e| {
            log::trace!("add ignored: {}", e);
        })?;
        if self.table.exists(&key) {
            return Err(AddError::Duplicate);
        }
        self.table.store(key, value);
        Ok(())
    }

    pub fn add(&mut self, value: E) -> &mut Self {
        let _ = self.try_add(value);
        self
    }

    /// Remove the member sharing `value`'s key and return the stored
    /// representative.
    pub fn take(&mut self, value: &E) -> Option<E> {
        let key = self.accepted_key(value).ok()?;
        if !self.table.exists(&key) {
            return None;
        }
        self.table.discard(&key)
    }

    pub fn remove(&mut self, value: &E) -> &mut Self {
        let _ = self.take(value);
        self
    }

    pub fn contains(&self, value: &E) -> bool {
        match self.accepted_key(value) {
            Ok(key) => self.table.exists(&key),
            Err(_) => false,
        }
    }

    /// The stored member sharing `value`'s key, which may be a different
    /// instance than `value`.
    pub fn get(&self, value: &E) -> Option<&E> {
        let key = self.accepted_key(value).ok()?;
        if !self.table.exists(&key) {
            return None;
        }
        self.table.load(&key)
    }

    /// Remove every member and every tombstone.
    pub fn clear(&mut self) {
        self.table.reset();
    }

    /// Visit each live member once, in an unspecified order that is stable
    /// for the duration of the call. Returns `false` if `f` asked to stop.
    ///
    /// The callback only gets shared access, so the set cannot be mutated
    /// while it is being traversed.
    pub fn for_each<F, R>(&self, mut f: F) -> bool
    where
        F: FnMut(&E) -> R,
        R: Step,
    {
        self.table.walk(|value| !f(value).is_stop())
    }

    /// An empty set with this set's policy and store configuration.
    pub fn empty(&self) -> Self
    where
        P: Clone,
    {
        Self::with_parts(self.policy.clone(), self.table.fresh())
    }
}

impl<E, P, T> Clone for KeyedSet<E, P, T>
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    /// Rebuilds through `add`, so the copy carries no tombstones.
    fn clone(&self) -> Self {
        let mut out = self.empty();
        self.for_each(|v| {
            out.add(v.clone());
        });
        out
    }
}

impl<E, P, T> Extend<E> for KeyedSet<E, P, T>
where
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}

impl<E, P> FromIterator<E> for KeyedSet<E, P>
where
    P: KeyPolicy<E> + Default,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdSet;
    use serde_json::{json, Value};
    use std::cell::Cell;

    /// Scenario: duplicate adds are ignored and string/number keys stay apart.
    #[test]
    fn add_dedupes_and_separates_tags() {
        let mut s = IdSet::new();
        s.add(json!("a")).add(json!(1)).add(json!("a"));
        assert_eq!(s.len(), 2);
        assert!(s.contains(&json!("a")));
        assert!(s.contains(&json!(1)));
        assert!(!s.contains(&json!("1")));
    }

    /// Invariant: unsupported values are inert for add, remove and contains.
    #[test]
    fn unsupported_values_are_inert() {
        let mut s = IdSet::new();
        s.add(json!("x"));
        assert_eq!(s.try_add(json!(null)), Err(AddError::Unsupported));
        s.add(json!(true)).add(json!([1, 2]));
        assert_eq!(s.len(), 1);
        assert!(!s.contains(&json!(true)));
        s.remove(&json!(null));
        assert_eq!(s.len(), 1);
    }

    /// Invariant: a duplicate add keeps the original stored instance.
    #[test]
    fn duplicate_add_keeps_original_instance() {
        let mut s = IdSet::new();
        s.add(json!(1));
        assert_eq!(s.try_add(json!(1.0)), Err(AddError::Duplicate));
        let stored = s.get(&json!(1.0)).unwrap();
        assert!(stored.is_i64());
    }

    /// Invariant: `len` counts live members and ignores tombstones.
    #[test]
    fn remove_tombstones_and_len_tracks_live() {
        let mut s = IdSet::new();
        s.extend([json!(1), json!(2), json!(3)]);
        assert_eq!(s.take(&json!(2)), Some(json!(2)));
        assert_eq!(s.take(&json!(2)), None);
        assert_eq!(s.len(), 2);
        assert_eq!(s.tombstones(), 1);
        assert!(!s.contains(&json!(2)));

        let mut seen = 0;
        s.for_each(|_| seen += 1);
        assert_eq!(seen, 2);

        s.add(json!(2));
        assert_eq!(s.len(), 3);
        assert_eq!(s.tombstones(), 0);

        s.remove(&json!(3));
        s.compact();
        assert_eq!(s.tombstones(), 0);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn clear_resets() {
        let mut s: KeyedSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        s.remove(&"a".to_string());
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.tombstones(), 0);
        assert!(s.for_each(|_| false));
    }

    /// Invariant: a set built over a populated store counts and removes the
    /// store's entries.
    #[test]
    fn with_parts_adopts_existing_entries() {
        let mut t: KeyTable<String> = KeyTable::new();
        t.store(IdKeys::string_key("a"), "a".to_string());
        let mut s: KeyedSet<String> = KeyedSet::with_parts(IdKeys, t);
        assert_eq!(s.len(), 1);
        assert!(s.contains(&"a".to_string()));

        s.remove(&"a".to_string());
        assert!(s.is_empty());
        s.remove(&"a".to_string());
        assert_eq!(s.len(), 0);
    }

    /// Invariant: removing many distinct keys does not leave a slot per key.
    #[test]
    fn churn_keeps_tombstones_bounded() {
        let mut s: KeyedSet<i64> = KeyedSet::new();
        for i in 0..100_000i64 {
            s.add(i);
            s.remove(&i);
        }
        assert_eq!(s.len(), 0);
        assert!(s.tombstones() < crate::key_table::COMPACT_MIN_TOMBSTONES);
    }

    /// Scenario: returning false on the second visit stops after two visits.
    #[test]
    fn for_each_stops_on_false() {
        let s: IdSet = [json!(1), json!(2), json!(3), json!(4)].into_iter().collect();
        let visits = Cell::new(0);
        let done = s.for_each(|_| {
            visits.set(visits.get() + 1);
            visits.get() != 2
        });
        assert!(!done);
        assert_eq!(visits.get(), 2);

        let mut all = 0;
        assert!(s.for_each(|_: &Value| {
            all += 1;
        }));
        assert_eq!(all, 4);

        let mut n = 0;
        let done = s.for_each(|_| {
            n += 1;
            if n == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(!done);
        assert_eq!(n, 3);
    }

    #[test]
    fn version_is_semver() {
        assert_eq!(IdSet::VERSION, "0.3.0");
        assert_eq!(IdSet::VERSION.split('.').count(), 3);
    }
}
