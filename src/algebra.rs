//! Set algebra and relational tests.
//!
//! Right-hand operands go through `SetOperand` first: an existing set is
//! borrowed as-is, sequences become the set of their members, and bare
//! values of the default domain become singletons. The operand is never
//! mutated and results never share storage with either side.

use crate::key::{IdKeys, KeyPolicy};
use crate::keyed_set::KeyedSet;
use crate::store::EntryStore;
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;

/// Anything that can stand on the right-hand side of a set operation on
/// `KeyedSet<E, P, T>`.
pub trait SetOperand<E, P, T>
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    /// View `self` as a set built like `like` (same policy and store
    /// configuration).
    fn normalize<'a>(self, like: &KeyedSet<E, P, T>) -> Cow<'a, KeyedSet<E, P, T>>
    where
        Self: 'a;
}

impl<'s, E, P, T> SetOperand<E, P, T> for &'s KeyedSet<E, P, T>
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    fn normalize<'a>(self, _like: &KeyedSet<E, P, T>) -> Cow<'a, KeyedSet<E, P, T>>
    where
        Self: 'a,
    {
        Cow::Borrowed(self)
    }
}

impl<E, P, T> SetOperand<E, P, T> for KeyedSet<E, P, T>
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    fn normalize<'a>(self, _like: &KeyedSet<E, P, T>) -> Cow<'a, KeyedSet<E, P, T>>
    where
        Self: 'a,
    {
        Cow::Owned(self)
    }
}

fn collect_like<E, P, T, I>(like: &KeyedSet<E, P, T>, items: I) -> KeyedSet<E, P, T>
where
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
    I: IntoIterator<Item = E>,
{
    let mut out = like.empty();
    out.extend(items);
    out
}

impl<E, P, T> SetOperand<E, P, T> for Vec<E>
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    fn normalize<'a>(self, like: &KeyedSet<E, P, T>) -> Cow<'a, KeyedSet<E, P, T>>
    where
        Self: 'a,
    {
        Cow::Owned(collect_like(like, self))
    }
}

impl<'s, E, P, T> SetOperand<E, P, T> for &'s [E]
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    fn normalize<'a>(self, like: &KeyedSet<E, P, T>) -> Cow<'a, KeyedSet<E, P, T>>
    where
        Self: 'a,
    {
        Cow::Owned(collect_like(like, self.iter().cloned()))
    }
}

impl<E, P, T, const N: usize> SetOperand<E, P, T> for [E; N]
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    fn normalize<'a>(self, like: &KeyedSet<E, P, T>) -> Cow<'a, KeyedSet<E, P, T>>
    where
        Self: 'a,
    {
        Cow::Owned(collect_like(like, self))
    }
}

// Bare values of the default domain act as singletons.
macro_rules! singleton_operand {
    ($($t:ty),*) => {
        $(
            impl<T> SetOperand<Value, IdKeys, T> for $t
            where
                T: EntryStore<Value>,
            {
                fn normalize<'a>(
                    self,
                    like: &KeyedSet<Value, IdKeys, T>,
                ) -> Cow<'a, KeyedSet<Value, IdKeys, T>>
                where
                    Self: 'a,
                {
                    Cow::Owned(collect_like(like, core::iter::once(Value::from(self))))
                }
            }
        )*
    };
}

singleton_operand!(Value, &str, String, i64, i32, u64, f64);

impl<E, P, T> KeyedSet<E, P, T>
where
    E: Clone,
    P: KeyPolicy<E> + Clone,
    T: EntryStore<E>,
{
    /// Build a set shaped like this one from any operand. Owned sets are
    /// moved in; borrowed sets are copied.
    pub fn from_operand<O: SetOperand<E, P, T>>(&self, other: O) -> Self {
        other.normalize(self).into_owned()
    }

    /// Members of both sides. Starts from a copy of `other` and then adds
    /// this set's members, so on a key collision the member from `other`
    /// is the one kept.
    pub fn union<O: SetOperand<E, P, T>>(&self, other: O) -> Self {
        let mut out = other.normalize(self).into_owned();
        self.for_each(|v| {
            out.add(v.clone());
        });
        out
    }

    /// Members of this set whose key is also in `other`. The stored
    /// representatives come from `other`.
    pub fn intersection<O: SetOperand<E, P, T>>(&self, other: O) -> Self {
        let other = other.normalize(self);
        let mut out = self.empty();
        other.for_each(|v| {
            if self.contains(v) {
                out.add(v.clone());
            }
        });
        out
    }

    pub fn difference<O: SetOperand<E, P, T>>(&self, other: O) -> Self {
        let other = other.normalize(self);
        let mut out = self.empty();
        self.for_each(|v| {
            if !other.contains(v) {
                out.add(v.clone());
            }
        });
        out
    }

    pub fn symmetric_difference<O: SetOperand<E, P, T>>(&self, other: O) -> Self {
        let other = other.normalize(self);
        let mut out = self.empty();
        self.for_each(|v| {
            if !other.contains(v) {
                out.add(v.clone());
            }
        });
        other.for_each(|v| {
            if !self.contains(v) {
                out.add(v.clone());
            }
        });
        out
    }

    pub fn is_disjoint<O: SetOperand<E, P, T>>(&self, other: O) -> bool {
        self.intersection(other).is_empty()
    }

    /// Decided by comparing the intersection's size with this set's size,
    /// so the answer always reflects total membership.
    pub fn is_subset<O: SetOperand<E, P, T>>(&self, other: O) -> bool {
        self.intersection(other).len() == self.len()
    }

    pub fn is_strict_subset<O: SetOperand<E, P, T>>(&self, other: O) -> bool {
        let other = other.normalize(self);
        self.intersection(&*other).len() == self.len() && other.len() != self.len()
    }

    pub fn is_superset<O: SetOperand<E, P, T>>(&self, other: O) -> bool {
        other.normalize(self).is_subset(self)
    }

    pub fn is_strict_superset<O: SetOperand<E, P, T>>(&self, other: O) -> bool {
        let other = other.normalize(self);
        other.is_subset(self) && other.len() != self.len()
    }

    pub fn all_in<O: SetOperand<E, P, T>>(&self, other: O) -> bool {
        self.is_subset(other)
    }

    pub fn all_not_in<O: SetOperand<E, P, T>>(&self, other: O) -> bool {
        self.is_disjoint(other)
    }
}

impl<E, P, T> KeyedSet<E, P, T>
where
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    fn same_members(&self, other: &Self) -> bool {
        self.len() == other.len() && self.every(|v| other.contains(v))
    }

    /// True iff `other` is a set of exactly this type with the same
    /// members. Any other value compares unequal.
    pub fn equals(&self, other: &dyn Any) -> bool
    where
        Self: 'static,
    {
        match other.downcast_ref::<Self>() {
            Some(o) => self.same_members(o),
            None => false,
        }
    }
}

impl<E, P, T> PartialEq for KeyedSet<E, P, T>
where
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    fn eq(&self, other: &Self) -> bool {
        self.same_members(other)
    }
}

impl<E, P, T> Eq for KeyedSet<E, P, T>
where
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
}
