//! Textual forms of a set. The JSON dump is meant for logs and debugging;
//! there is no way to parse it back into a set.

use crate::key::KeyPolicy;
use crate::keyed_set::KeyedSet;
use crate::store::EntryStore;
use core::fmt;
use serde::ser::{Serialize, SerializeSeq, Serializer};

impl<E, P, T> Serialize for KeyedSet<E, P, T>
where
    E: Serialize,
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    /// Members as a sequence in traversal order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        let mut failed = None;
        self.for_each(|v| match seq.serialize_element(v) {
            Ok(()) => true,
            Err(e) => {
                failed = Some(e);
                false
            }
        });
        if let Some(e) = failed {
            return Err(e);
        }
        seq.end()
    }
}

/// JSON array of the members in traversal order, e.g. `["a",1]`.
impl<E, P, T> fmt::Display for KeyedSet<E, P, T>
where
    E: Serialize,
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl<E, P, T> fmt::Debug for KeyedSet<E, P, T>
where
    E: fmt::Debug,
    P: KeyPolicy<E>,
    T: EntryStore<E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        self.for_each(|v| {
            set.entry(v);
        });
        set.finish()
    }
}
