//! Bounded, shallow JSON document used for Notecard requests and replies.
//!
//! A [`Document`] is an ordered list of top-level fields. Each field holds a
//! scalar or a one-level object of scalars, the same shape as the Notecard's
//! request envelope (`{"req":"note.add","body":{"temp":21.5}}`). Anything
//! deeper is not representable: arrays and objects below the first level are
//! dropped when a reply is parsed.
//!
//! Field order is the order keys were first set; overwriting a key replaces
//! its value in place.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DocumentError;
use crate::json::base64;

// ───────────────────────────────────────────────────────────────
// Values
// ───────────────────────────────────────────────────────────────

/// Leaf value.
///
/// Signed and unsigned 32-bit integers share one representation, so a value
/// set as `u32` reads back through `get_i32` when it fits, and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Int(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Floats, and integers widened to float.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Str(v.into())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

/// Top-level field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// One level of nesting, scalars only.
    Object(Vec<(String, Scalar)>),
}

// ───────────────────────────────────────────────────────────────
// Document
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Top-level fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ── Setters ──────────────────────────────────────────────

    /// Set a top-level scalar, replacing any previous value for `key`.
    pub fn set(&mut self, key: &str, value: impl Into<Scalar>) {
        upsert(&mut self.fields, key, Value::Scalar(value.into()));
    }

    /// Set `key.nested`. If `key` currently holds a scalar it becomes an
    /// object.
    pub fn set_nested(&mut self, key: &str, nested: &str, value: impl Into<Scalar>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, Value::Object(inner))) => upsert(inner, nested, value),
            Some((_, slot)) => *slot = Value::Object(alloc::vec![(nested.into(), value)]),
            None => self
                .fields
                .push((key.into(), Value::Object(alloc::vec![(nested.into(), value)]))),
        }
    }

    /// Store `bytes` as a Base64 string.
    pub fn set_base64(&mut self, key: &str, bytes: &[u8]) {
        self.set(key, base64::encode(bytes));
    }

    /// Store `bytes` as a Base64 string under `key.nested`.
    pub fn set_nested_base64(&mut self, key: &str, nested: &str, bytes: &[u8]) {
        self.set_nested(key, nested, base64::encode(bytes));
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    // ── Presence ─────────────────────────────────────────────

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// `false` unless `key` holds an object containing `nested`.
    pub fn has_nested(&self, key: &str, nested: &str) -> bool {
        self.get_nested(key, nested).is_some()
    }

    // ── Getters ──────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_scalar(&self, key: &str) -> Option<&Scalar> {
        match self.get(key)? {
            Value::Scalar(s) => Some(s),
            Value::Object(_) => None,
        }
    }

    pub fn get_nested(&self, key: &str, nested: &str) -> Option<&Scalar> {
        match self.get(key)? {
            Value::Object(inner) => inner.iter().find(|(k, _)| k == nested).map(|(_, v)| v),
            Value::Scalar(_) => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_scalar(key)?.as_str()
    }

    /// Copy a string field into a fixed-capacity string, truncating on a
    /// character boundary if it does not fit.
    pub fn get_string<const N: usize>(&self, key: &str) -> Option<heapless::String<N>> {
        self.get_str(key).map(truncated)
    }

    /// Copy a string field into `buf` as NUL-terminated bytes, truncating if
    /// needed. Returns the number of text bytes copied (terminator excluded).
    pub fn copy_str(&self, key: &str, buf: &mut [u8]) -> Option<usize> {
        self.get_str(key).map(|s| copy_terminated(s, buf))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_scalar(key)?.as_bool()
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        self.get_scalar(key)?.as_i32()
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get_scalar(key)?.as_u32()
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get_scalar(key)?.as_f32()
    }

    pub fn get_nested_str(&self, key: &str, nested: &str) -> Option<&str> {
        self.get_nested(key, nested)?.as_str()
    }

    pub fn get_nested_string<const N: usize>(
        &self,
        key: &str,
        nested: &str,
    ) -> Option<heapless::String<N>> {
        self.get_nested_str(key, nested).map(truncated)
    }

    pub fn copy_nested_str(&self, key: &str, nested: &str, buf: &mut [u8]) -> Option<usize> {
        self.get_nested_str(key, nested)
            .map(|s| copy_terminated(s, buf))
    }

    pub fn get_nested_bool(&self, key: &str, nested: &str) -> Option<bool> {
        self.get_nested(key, nested)?.as_bool()
    }

    pub fn get_nested_i32(&self, key: &str, nested: &str) -> Option<i32> {
        self.get_nested(key, nested)?.as_i32()
    }

    pub fn get_nested_u32(&self, key: &str, nested: &str) -> Option<u32> {
        self.get_nested(key, nested)?.as_u32()
    }

    pub fn get_nested_f32(&self, key: &str, nested: &str) -> Option<f32> {
        self.get_nested(key, nested)?.as_f32()
    }

    // ── Wire form ────────────────────────────────────────────

    /// Compact JSON text.
    pub fn to_json(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec(self).map_err(|_| DocumentError::Malformed)
    }

    /// Append compact JSON text to `buf`. Nothing is appended if it does not
    /// fit. Returns the number of bytes appended.
    pub fn serialize_into<const N: usize>(
        &self,
        buf: &mut heapless::Vec<u8, N>,
    ) -> Result<usize, DocumentError> {
        let json = self.to_json()?;
        buf.extend_from_slice(&json)
            .map_err(|()| DocumentError::TooLarge)?;
        Ok(json.len())
    }

    /// Parse a JSON object. Surrounding whitespace (including the framing
    /// newline) is accepted.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(bytes).map_err(|_| DocumentError::Malformed)
    }
}

fn upsert<T>(fields: &mut Vec<(String, T)>, key: &str, value: T) {
    match fields.iter_mut().find(|(k, _)| k == key) {
        Some(slot) => slot.1 = value,
        None => fields.push((key.into(), value)),
    }
}

fn floor_boundary(s: &str, max: usize) -> usize {
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let end = floor_boundary(s, N);
    // Cannot fail: `end <= N`.
    let _ = out.push_str(&s[..end]);
    out
}

fn copy_terminated(s: &str, buf: &mut [u8]) -> usize {
    let Some(room) = buf.len().checked_sub(1) else {
        return 0;
    };
    let end = floor_boundary(s, room);
    buf[..end].copy_from_slice(&s.as_bytes()[..end]);
    buf[end] = 0;
    end
}

// ───────────────────────────────────────────────────────────────
// serde
// ───────────────────────────────────────────────────────────────

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(f) if f.is_finite() => serializer.serialize_f32(*f),
            Self::Float(_) => serializer.serialize_unit(),
            Self::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => s.serialize(serializer),
            Self::Object(fields) => serialize_fields(fields, serializer),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_fields(&self.fields, serializer)
    }
}

fn serialize_fields<T: Serialize, S: Serializer>(
    fields: &[(String, T)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (k, v) in fields {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Document, A::Error> {
        let mut doc = Document::new();
        while let Some(key) = map.next_key::<String>()? {
            if let Some(value) = map.next_value_seed(ValueSeed { nested: false })? {
                upsert(&mut doc.fields, &key, value);
            }
        }
        Ok(doc)
    }
}

/// Parses one value; `None` means the value was skipped because it is
/// deeper than the document can hold.
#[derive(Clone, Copy)]
struct ValueSeed {
    nested: bool,
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
    type Value = Option<Value>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ValueSeed {
    type Value = Option<Value>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Some(Value::Scalar(Scalar::Null)))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        self.visit_unit()
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(Value::Scalar(Scalar::Bool(v))))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Value::Scalar(Scalar::Int(v))))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let scalar = match i64::try_from(v) {
            Ok(i) => Scalar::Int(i),
            Err(_) => Scalar::Float(v as f32),
        };
        Ok(Some(Value::Scalar(scalar)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(Value::Scalar(Scalar::Float(v as f32))))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(Value::Scalar(Scalar::Str(v.into()))))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(Value::Scalar(Scalar::Str(v))))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        if self.nested {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            return Ok(None);
        }
        let mut inner = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if let Some(Value::Scalar(s)) = map.next_value_seed(ValueSeed { nested: true })? {
                upsert(&mut inner, &key, s);
            }
        }
        Ok(Some(Value::Object(inner)))
    }
}

// ── Tests ────────────────────────────────────────────────────
