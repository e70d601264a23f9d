//! Key encoders for states and actions
//!
//! The Q-table never hashes or compares states and actions directly. Each
//! value is first turned into a string key by an injected encoder, and two
//! values with the same key share a Q-value entry. Encoders must therefore be
//! pure: the same input has to produce the same key for as long as a table
//! built with that encoder is alive (and across processes, if the table is
//! persisted).

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, SeqAccess, Visitor},
};
use serde_json::Value;

use crate::Result;

/// Encoded state key
pub type StateKey = String;

/// Encoded action key
pub type ActionKey = String;

/// Maps a value to its stable string key.
pub trait KeyEncoder<T: ?Sized> {
    fn encode(&self, value: &T) -> String;
}

/// Any `Fn(&T) -> String` closure is an encoder.
impl<T: ?Sized, F> KeyEncoder<T> for F
where
    F: Fn(&T) -> String,
{
    fn encode(&self, value: &T) -> String {
        self(value)
    }
}

/// Default encoder.
///
/// Strings pass through unchanged; every other value is serialized to
/// compact JSON, so `(1, 2)` becomes `[1,2]` and a unit enum variant
/// `Up` becomes `Up`.
///
/// Map entries are always written sorted by key, whatever the map's
/// iteration order, so equal `HashMap`s share a key. Maps whose keys JSON
/// cannot represent (tuples, structs) are written as `{key:value,...}` with
/// each key rendered the same way.
///
/// Sequence order is part of the key: serde hands sets and vectors over in
/// the same shape, so a `HashSet` inside a state would leak its iteration
/// order. Use [`UnorderedEncoder`], a `BTreeSet`, or a closure for such states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultEncoder;

impl<T> KeyEncoder<T> for DefaultEncoder
where
    T: Serialize + ?Sized,
{
    fn encode(&self, value: &T) -> String {
        match serde_json::to_value(value) {
            Ok(Value::String(s)) => s,
            Ok(other) => other.to_string(),
            // Non-string map keys
            Err(_) => canonical_key(value, false),
        }
    }
}

/// Encoder for states built from unordered collections.
///
/// Like [`DefaultEncoder`], but the elements of every sequence are sorted
/// before the key is written, so two `HashSet`s with the same members always
/// share a key. The flip side is that `vec![1, 2]` and `vec![2, 1]` do too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnorderedEncoder;

impl<T> KeyEncoder<T> for UnorderedEncoder
where
    T: Serialize + ?Sized,
{
    fn encode(&self, value: &T) -> String {
        canonical_key(value, true)
    }
}

fn canonical_key<T: Serialize + ?Sized>(value: &T, unordered: bool) -> String {
    match Canonical::of(value, unordered) {
        Ok(Canonical::Str(s)) => s,
        Ok(canonical) => canonical.to_string(),
        Err(err) => {
            // Only a failing `Serialize` impl gets here
            let key = format!("<unencodable {}>", std::any::type_name::<T>());
            tracing::warn!(%err, %key, "value could not be serialized into a key");
            key
        }
    }
}

/// Serialized value with map entries (and optionally sequences) in sorted order
///
/// Built by round-tripping through named MessagePack, which, unlike JSON,
/// accepts any map key.
#[derive(Debug, Clone, PartialEq)]
enum Canonical {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Seq(Vec<Canonical>),
    Map(Vec<(Canonical, Canonical)>),
}

impl Canonical {
    fn of<T: Serialize + ?Sized>(value: &T, unordered: bool) -> Result<Self> {
        let packed = rmp_serde::to_vec_named(&value)?;
        let mut canonical: Canonical = rmp_serde::from_slice(&packed)?;
        canonical.sort(unordered);
        Ok(canonical)
    }

    fn sort(&mut self, sequences: bool) {
        match self {
            Canonical::Seq(items) => {
                items.iter_mut().for_each(|item| item.sort(sequences));
                if sequences {
                    items.sort_by_cached_key(ToString::to_string);
                }
            }
            Canonical::Map(entries) => {
                for (key, value) in entries.iter_mut() {
                    key.sort(sequences);
                    value.sort(sequences);
                }
                entries.sort_by_cached_key(|(key, _)| key.to_string());
            }
            _ => {}
        }
    }
}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Canonical::Null => f.write_str("null"),
            Canonical::Bool(b) => write!(f, "{b}"),
            Canonical::Int(i) => write!(f, "{i}"),
            Canonical::Uint(u) => write!(f, "{u}"),
            Canonical::Float(x) => write!(f, "{x:?}"),
            Canonical::Str(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            Canonical::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Canonical::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl<'de> Deserialize<'de> for Canonical {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(CanonicalVisitor)
    }
}

struct CanonicalVisitor;

impl<'de> Visitor<'de> for CanonicalVisitor {
    type Value = Canonical;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any MessagePack value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Uint(v))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Str(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Str(v))
    }

    fn visit_bytes<E>(self, v: &[u8]) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Seq(
            v.iter().map(|&b| Canonical::Uint(b.into())).collect(),
        ))
    }

    fn visit_unit<E>(self) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Null)
    }

    fn visit_none<E>(self) -> std::result::Result<Canonical, E> {
        Ok(Canonical::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Canonical, D::Error> {
        Canonical::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Canonical, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Canonical::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Canonical, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(Canonical::Map(entries))
    }
}
