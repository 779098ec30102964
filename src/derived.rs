//! Higher-order operations built only on `KeyedSet::for_each`.

use crate::key::KeyPolicy;
use crate::keyed_set::KeyedSet;
use crate::store::EntryStore;

impl<E, P, T> KeyedSet<E, P, T>
where
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    /// Members for which `f` holds, in a set with the same policy.
    pub fn filter<F>(&self, mut f: F) -> Self
    where
        E: Clone,
        P: Clone,
        F: FnMut(&E) -> bool,
    {
        let mut out = self.empty();
        self.for_each(|v| {
            if f(v) {
                out.add(v.clone());
            }
        });
        out
    }

    /// Add `f(member)` for every member to `target` and return it. Keys are
    /// derived again for the mapped values, so outputs that collide keep
    /// only the first one visited.
    pub fn map_into<U, Q, T2, F>(
        &self,
        mut target: KeyedSet<U, Q, T2>,
        mut f: F,
    ) -> KeyedSet<U, Q, T2>
    where
        Q: KeyPolicy<U>,
        T2: EntryStore<U>,
        F: FnMut(&E) -> U,
    {
        self.for_each(|v| {
            target.add(f(v));
        });
        target
    }

    /// `map_into` a fresh default set.
    pub fn map<U, Q, F>(&self, f: F) -> KeyedSet<U, Q>
    where
        Q: KeyPolicy<U> + Default,
        F: FnMut(&E) -> U,
    {
        self.map_into(KeyedSet::new(), f)
    }

    pub fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &E) -> A,
    {
        let mut acc = Some(init);
        self.for_each(|v| {
            acc = acc.take().map(|a| f(a, v));
        });
        // Every step puts the accumulator back.
        acc.unwrap_or_else(|| unreachable!())
    }

    /// Fold over the members. Without `initial`, the first visited member
    /// seeds the accumulator and is not passed to `f`; an empty set then
    /// yields `None`.
    pub fn reduce<F>(&self, mut f: F, initial: Option<E>) -> Option<E>
    where
        E: Clone,
        F: FnMut(E, &E) -> E,
    {
        let mut acc = initial;
        self.for_each(|v| {
            acc = Some(match acc.take() {
                None => v.clone(),
                Some(a) => f(a, v),
            });
        });
        acc
    }

    /// True iff `f` holds for every member. Stops at the first failure.
    pub fn every<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        self.for_each(|v| f(v))
    }

    /// True iff `f` holds for some member. Stops at the first success.
    pub fn some<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        !self.for_each(|v| !f(v))
    }

    /// Members in traversal order.
    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|v| out.push(v.clone()));
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::{IdSet, KeyedSet};
    use serde_json::{json, Value};

    fn nums(xs: &[i64]) -> IdSet {
        xs.iter().map(|&x| json!(x)).collect()
    }

    #[test]
    fn filter_keeps_matching_members() {
        let s = nums(&[1, 2, 3, 4, 5]);
        let even = s.filter(|v| v.as_i64().map_or(false, |n| n % 2 == 0));
        assert_eq!(even, nums(&[2, 4]));
        assert_eq!(s.len(), 5);
    }

    /// Invariant: colliding mapped values collapse to one member.
    #[test]
    fn map_collapses_colliding_outputs() {
        let s = nums(&[1, 2, 3, 4]);
        let parity: IdSet = s.map(|v| json!(v.as_i64().unwrap_or(0) % 2));
        assert_eq!(parity.len(), 2);
        assert!(parity.contains(&json!(0)));
        assert!(parity.contains(&json!(1)));

        let labels: KeyedSet<String> = s.map(|v| format!("n{}", v));
        assert_eq!(labels.len(), 4);
        assert!(labels.contains(&"n3".to_string()));
    }

    /// Invariant: mapping to unsupported values drops them.
    #[test]
    fn map_drops_unsupported_outputs() {
        let s = nums(&[1, 2]);
        let out: IdSet = s.map(|_| Value::Null);
        assert!(out.is_empty());
    }

    #[test]
    fn reduce_with_and_without_initial() {
        let s: KeyedSet<i64> = [1i64, 2, 3, 4].into_iter().collect();
        let mut calls = 0;
        let sum = s.reduce(
            |a, b| {
                calls += 1;
                a + b
            },
            None,
        );
        assert_eq!(sum, Some(10));
        // First member seeds the accumulator and is not passed to `f`.
        assert_eq!(calls, 3);

        assert_eq!(s.reduce(|a, b| a + b, Some(100)), Some(110));

        let empty: KeyedSet<i64> = KeyedSet::new();
        assert_eq!(empty.reduce(|a, b| a + b, None), None);
        assert_eq!(empty.reduce(|a, b| a + b, Some(7)), Some(7));
    }

    #[test]
    fn fold_changes_accumulator_type() {
        let s: KeyedSet<String> = ["ab", "cde"].iter().map(|s| s.to_string()).collect();
        assert_eq!(s.fold(0usize, |n, v| n + v.len()), 5);
    }

    /// Invariant: `every` and `some` short-circuit.
    #[test]
    fn every_and_some_short_circuit() {
        let s = nums(&[1, 2, 3, 4]);
        let mut visited = 0;
        assert!(!s.every(|_| {
            visited += 1;
            visited < 2
        }));
        assert_eq!(visited, 2);

        let mut visited = 0;
        assert!(s.some(|_| {
            visited += 1;
            true
        }));
        assert_eq!(visited, 1);

        assert!(s.every(|v| v.is_number()));
        assert!(!s.some(|v| v.is_string()));
        assert!(IdSet::new().every(|_| false));
        assert!(!IdSet::new().some(|_| true));
    }

    #[test]
    fn to_vec_lists_members() {
        let s = nums(&[3, 1, 2]);
        let mut v: Vec<i64> = s.to_vec().iter().filter_map(Value::as_i64).collect();
        v.sort();
        assert_eq!(v, vec![1, 2, 3]);
    }
}
