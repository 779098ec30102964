//! Key derivation: the first two steps of every value-facing operation.
//!
//! A `KeyPolicy` turns a value into a `Derived` result and then decides
//! whether the derived key is acceptable. The container never inspects
//! values directly; swapping the policy retargets it to a new domain.

use core::fmt;
use serde_json::Value;

/// Internal identity of a member. Two values with equal keys are the
/// same member of a set.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Wrap an already-encoded key. Custom policies are responsible for
    /// keeping their encodings collision-free.
    pub fn new(raw: impl Into<String>) -> Self {
        Key(raw.into())
    }

    /// Build a key from a one-character type tag and a body, e.g. `S` + `"a"`.
    pub fn tagged(tag: char, body: &str) -> Self {
        let mut s = String::with_capacity(body.len() + tag.len_utf8());
        s.push(tag);
        s.push_str(body);
        Key(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of key derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Derived {
    Key(Key),
    /// The value is outside the policy's domain and is inert.
    Unsupported,
}

impl Derived {
    pub fn key(&self) -> Option<&Key> {
        match self {
            Derived::Key(k) => Some(k),
            Derived::Unsupported => None,
        }
    }

    pub fn into_key(self) -> Option<Key> {
        match self {
            Derived::Key(k) => Some(k),
            Derived::Unsupported => None,
        }
    }
}

impl From<Option<Key>> for Derived {
    fn from(k: Option<Key>) -> Self {
        k.map_or(Derived::Unsupported, Derived::Key)
    }
}

/// Value-to-key mapping used by `KeyedSet`.
///
/// `derive_key` must be pure and deterministic: the same value always
/// yields the same key for the lifetime of the set.
pub trait KeyPolicy<E> {
    fn derive_key(&self, value: &E) -> Derived;

    /// Validation applied after derivation. The default accepts every
    /// supported key.
    fn is_acceptable(&self, derived: &Derived) -> bool {
        matches!(derived, Derived::Key(_))
    }
}

/// Default policy for strings and numbers. Strings and numbers carry
/// distinct tags so the string `"1"` and the number `1` never collide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdKeys;

pub(crate) const STRING_TAG: char = 'S';
pub(crate) const NUMBER_TAG: char = 'N';

impl IdKeys {
    pub fn string_key(s: &str) -> Key {
        Key::tagged(STRING_TAG, s)
    }

    pub fn float_key(n: f64) -> Key {
        Key::tagged(NUMBER_TAG, &canonical_float(n))
    }

    pub fn int_key(n: i64) -> Key {
        Key::tagged(NUMBER_TAG, &n.to_string())
    }

    pub fn uint_key(n: u64) -> Key {
        Key::tagged(NUMBER_TAG, &n.to_string())
    }
}

// Integral floats print without a fraction so `1.0` and `1` share a key.
// Rust's float formatting never switches to exponent notation.
fn canonical_float(n: f64) -> String {
    if n == 0.0 {
        return "0".to_owned();
    }
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    format!("{}", n)
}

impl KeyPolicy<Value> for IdKeys {
    fn derive_key(&self, value: &Value) -> Derived {
        match value {
            Value::String(s) => Derived::Key(Self::string_key(s)),
            Value::Number(n) => {
                let key = if let Some(i) = n.as_i64() {
                    Self::int_key(i)
                } else if let Some(u) = n.as_u64() {
                    Self::uint_key(u)
                } else {
                    match n.as_f64() {
                        Some(f) => Self::float_key(f),
                        None => return Derived::Unsupported,
                    }
                };
                Derived::Key(key)
            }
            _ => Derived::Unsupported,
        }
    }
}

impl KeyPolicy<String> for IdKeys {
    fn derive_key(&self, value: &String) -> Derived {
        Derived::Key(Self::string_key(value))
    }
}

impl<'a> KeyPolicy<&'a str> for IdKeys {
    fn derive_key(&self, value: &&'a str) -> Derived {
        Derived::Key(Self::string_key(value))
    }
}

impl KeyPolicy<i64> for IdKeys {
    fn derive_key(&self, value: &i64) -> Derived {
        Derived::Key(Self::int_key(*value))
    }
}

impl KeyPolicy<i32> for IdKeys {
    fn derive_key(&self, value: &i32) -> Derived {
        Derived::Key(Self::int_key(i64::from(*value)))
    }
}

impl KeyPolicy<u64> for IdKeys {
    fn derive_key(&self, value: &u64) -> Derived {
        Derived::Key(Self::uint_key(*value))
    }
}

impl KeyPolicy<f64> for IdKeys {
    fn derive_key(&self, value: &f64) -> Derived {
        Derived::Key(Self::float_key(*value))
    }
}
