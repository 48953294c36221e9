//! Capture a `Serialize` value as a JSON tree, refusing what JSON cannot hold.
//!
//! `serde_json::to_value` maps NaN to `null` and reports bad map keys without
//! saying where they are. Seal bodies must never be coerced, so this
//! serializer rejects those values and names the path of the defect.

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

use crate::canonical::{render_path, Segment, MAX_DEPTH};
use crate::error::CanonicalError;

/// Serialize `value` into a [`Value`] with strict JSON semantics.
pub(crate) fn capture_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, CanonicalError> {
    value.serialize(Capture { path: Vec::new() })
}

struct Capture {
    path: Vec<Segment>,
}

impl Capture {
    fn child(&self, segment: Segment) -> Capture {
        let mut path = self.path.clone();
        path.push(segment);
        Capture { path }
    }

    fn unsupported(&self, found: impl Into<String>) -> CanonicalError {
        CanonicalError::UnsupportedType {
            path: render_path(&self.path),
            found: found.into(),
        }
    }

    fn enter(&self) -> Result<(), CanonicalError> {
        if self.path.len() >= MAX_DEPTH {
            return Err(CanonicalError::DepthExceeded {
                path: render_path(&self.path),
                limit: MAX_DEPTH,
            });
        }
        Ok(())
    }
}

impl ser::Serializer for Capture {
    type Ok = Value;
    type Error = CanonicalError;

    type SerializeSeq = SeqCapture;
    type SerializeTuple = SeqCapture;
    type SerializeTupleStruct = SeqCapture;
    type SerializeTupleVariant = VariantCapture<SeqCapture>;
    type SerializeMap = MapCapture;
    type SerializeStruct = MapCapture;
    type SerializeStructVariant = VariantCapture<MapCapture>;

    fn serialize_bool(self, v: bool) -> Result<Value, CanonicalError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, CanonicalError> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Value, CanonicalError> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Value, CanonicalError> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Value, CanonicalError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, CanonicalError> {
        if let Ok(i) = i64::try_from(v) {
            Ok(Value::Number(i.into()))
        } else if let Ok(u) = u64::try_from(v) {
            Ok(Value::Number(u.into()))
        } else {
            Err(self.unsupported(format!("128-bit integer {v} out of range")))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value, CanonicalError> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Value, CanonicalError> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Value, CanonicalError> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Value, CanonicalError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, CanonicalError> {
        match u64::try_from(v) {
            Ok(u) => Ok(Value::Number(u.into())),
            Err(_) => Err(self.unsupported(format!("128-bit integer {v} out of range"))),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value, CanonicalError> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<Value, CanonicalError> {
        match Number::from_f64(v) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(self.unsupported(format!("non-finite number {v}"))),
        }
    }

    fn serialize_char(self, v: char) -> Result<Value, CanonicalError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, CanonicalError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, CanonicalError> {
        Ok(Value::Array(v.iter().map(|b| Value::Number((*b).into())).collect()))
    }

    fn serialize_none(self) -> Result<Value, CanonicalError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, CanonicalError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, CanonicalError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, CanonicalError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, CanonicalError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, CanonicalError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, CanonicalError> {
        self.enter()?;
        let inner = value.serialize(self.child(Segment::Key(variant.to_string())))?;
        let mut map = Map::new();
        map.insert(variant.to_string(), inner);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCapture, CanonicalError> {
        self.enter()?;
        Ok(SeqCapture {
            items: Vec::with_capacity(len.unwrap_or(0)),
            parent: self,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqCapture, CanonicalError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqCapture, CanonicalError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantCapture<SeqCapture>, CanonicalError> {
        self.enter()?;
        let inner = self
            .child(Segment::Key(variant.to_string()))
            .serialize_seq(Some(len))?;
        Ok(VariantCapture { variant, inner })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapCapture, CanonicalError> {
        self.enter()?;
        Ok(MapCapture {
            map: Map::new(),
            next_key: None,
            parent: self,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<MapCapture, CanonicalError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantCapture<MapCapture>, CanonicalError> {
        self.enter()?;
        let inner = self
            .child(Segment::Key(variant.to_string()))
            .serialize_map(Some(len))?;
        Ok(VariantCapture { variant, inner })
    }
}

struct SeqCapture {
    parent: Capture,
    items: Vec<Value>,
}

impl SeqCapture {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CanonicalError> {
        let child = self.parent.child(Segment::Index(self.items.len()));
        self.items.push(value.serialize(child)?);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqCapture {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CanonicalError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqCapture {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CanonicalError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqCapture {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CanonicalError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(Value::Array(self.items))
    }
}

struct MapCapture {
    parent: Capture,
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl MapCapture {
    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<(), CanonicalError> {
        let child = self.parent.child(Segment::Key(key.clone()));
        if self.map.contains_key(&key) {
            return Err(CanonicalError::DuplicateKey {
                path: render_path(&child.path),
            });
        }
        let captured = value.serialize(child)?;
        self.map.insert(key, captured);
        Ok(())
    }
}

impl ser::SerializeMap for MapCapture {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CanonicalError> {
        // Keys are captured as values and must come out as strings.
        match key.serialize(Capture { path: self.parent.path.clone() })? {
            Value::String(s) => {
                self.next_key = Some(s);
                Ok(())
            }
            other => Err(self.parent.unsupported(format!("non-string object key {other}"))),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CanonicalError> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| CanonicalError::Serialization("map value without key".into()))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for MapCapture {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CanonicalError> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(Value::Object(self.map))
    }
}

/// Externally tagged enum variant: `{ "<variant>": <inner> }`.
struct VariantCapture<S> {
    variant: &'static str,
    inner: S,
}

impl<S> VariantCapture<S> {
    fn wrap(variant: &'static str, inner: Value) -> Value {
        let mut map = Map::new();
        map.insert(variant.to_string(), inner);
        Value::Object(map)
    }
}

impl ser::SerializeTupleVariant for VariantCapture<SeqCapture> {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CanonicalError> {
        self.inner.push(value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(Self::wrap(self.variant, Value::Array(self.inner.items)))
    }
}

impl ser::SerializeStructVariant for VariantCapture<MapCapture> {
    type Ok = Value;
    type Error = CanonicalError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CanonicalError> {
        self.inner.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value, CanonicalError> {
        Ok(Self::wrap(self.variant, Value::Object(self.inner.map)))
    }
}
