//! keyed-set: a set whose membership is decided by derived identity keys,
//! with a pluggable mapping from values to keys and a full set algebra.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep every algorithm correct for any key mapping by routing all
//!   value-facing work through a small, fixed pipeline.
//! - Layers:
//!   - KeyPolicy<E>: derive a `Key` from a value (or report it as
//!     unsupported) and decide whether the key is acceptable.
//!   - EntryStore<E>: raw `exists`/`store`/`load`/`discard` over keys.
//!     The default `KeyTable` keeps slots in a `SlotMap` indexed by a
//!     `HashTable`, and tombstones removed slots until enough of them pile
//!     up to compact.
//!   - KeyedSet<E, P, T>: the public container. `add`, `remove` and
//!     `contains` run derive → accept → exists and stop at the first
//!     failing step; everything else is built on `for_each`.
//!
//! Constraints
//! - Single-threaded: the store is `!Send`/`!Sync`.
//! - `len` is the store's live count, maintained on every store/discard,
//!   never by scanning.
//! - Traversal order is unspecified but stable within one `for_each` call.
//! - A `for_each` callback only sees `&E`; mutating the traversed set from
//!   inside it does not compile.
//!
//! Default domain
//! - `IdSet` holds `serde_json::Value`s. Strings map to `S…` keys and
//!   numbers to `N…` keys, so `"1"` and `1` are different members while
//!   `1` and `1.0` are the same one. Every other JSON value is
//!   unsupported and silently ignored.
//! - `IdKeys` also maps `String`, `&str`, `i32`, `i64`, `u64` and `f64`,
//!   so `KeyedSet<String>` or `KeyedSet<i64>` work directly.
//!
//! Semantics worth knowing
//! - Adding a present key is a no-op; the first stored instance stays.
//! - `union` starts from the argument, so on a key collision the
//!   argument's member wins. `intersection` keeps the argument's members.
//! - `map` derives keys again; colliding outputs collapse to one member.
//! - Errors are not reported by the set operations. `try_add` exists for
//!   callers that want to know why a value was not stored.
//!
//! Retargeting
//! - Implement `KeyPolicy` for a record type to identify it by a field;
//!   override `is_acceptable` to add validation without touching key
//!   derivation.

mod algebra;
mod derived;
mod error;
pub mod key;
pub mod key_table;
mod keyed_set;
mod keyed_set_proptest;
mod render;
pub mod store;

// Public surface
pub use algebra::SetOperand;
pub use error::AddError;
pub use key::{Derived, IdKeys, Key, KeyPolicy};
pub use key_table::KeyTable;
pub use keyed_set::{KeyedSet, Step};
pub use store::EntryStore;

/// Set of strings and numbers held as JSON values.
pub type IdSet = KeyedSet<serde_json::Value, IdKeys>;
