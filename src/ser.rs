//! Serde serialization into a [`Graph`].
//!
//! Any `T: Serialize` can be turned into a graph and from there into a Taxi
//! document. Serde data is tree-shaped, so every node built here is fresh; use
//! the [`Graph`] API directly to express shared or cyclic structure.
//!
//! | Serde data | Graph |
//! |------------|-------|
//! | bool, numbers, char, str | Scalar text (`true`/`false` for bools) |
//! | `None`, `()`, unit struct | absent Scalar |
//! | seq, tuple | Sequence |
//! | tuple struct | Sequence with `class` = struct name |
//! | map | Mapping (keys must be strings, numbers, chars or bools) |
//! | struct | Mapping with `class` = struct name |
//! | unit variant | Scalar holding the variant name |
//! | other variants | one-entry Mapping `{variant: payload}` |
//!
//! `Some(x)` is written as `x` itself, so `None`, `Some(None)`, `()` and
//! `Some(())` all become the same absent Scalar. Reading that back as
//! `Option<Option<T>>` gives `None`; a distinction between the outer and inner
//! `None` is not kept.
//!
//! ```rust
//! use serde::Serialize;
//! use serde_taxi::to_graph;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let graph = to_graph(&Point { x: 1, y: 2 }).unwrap();
//! let root = graph.resolve(graph.root()).unwrap();
//! assert_eq!(root.class(), Some("Point"));
//! assert_eq!(root.as_mapping().unwrap().get("x").and_then(|v| v.as_str()), Some("1"));
//! ```

use crate::{Error, Graph, Node, Result, TaxiMap, Value};
use serde::{ser, Serialize};

/// Serializes one value into a graph, returning the slot that holds it.
pub(crate) struct Serializer<'g> {
    graph: &'g mut Graph,
}

impl<'g> Serializer<'g> {
    pub(crate) fn new(graph: &'g mut Graph) -> Self {
        Serializer { graph }
    }
}

fn text(value: impl ToString) -> Value {
    Value::Scalar(Some(value.to_string()))
}

fn wrap_variant(graph: &mut Graph, variant: &'static str, payload: Value) -> Value {
    let mut map = TaxiMap::with_capacity(1);
    map.insert(variant.to_string(), payload);
    Value::Node(graph.insert(Node::mapping(map)))
}

impl<'g> ser::Serializer for Serializer<'g> {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec<'g>;
    type SerializeTuple = SerializeVec<'g>;
    type SerializeTupleStruct = SerializeVec<'g>;
    type SerializeTupleVariant = SerializeTupleVariant<'g>;
    type SerializeMap = SerializeMap<'g>;
    type SerializeStruct = SerializeMap<'g>;
    type SerializeStructVariant = SerializeStructVariant<'g>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(text(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let items = v.iter().map(|b| text(*b)).collect();
        Ok(Value::Node(self.graph.insert(Node::sequence(items))))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::absent())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::absent())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::absent())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let payload = value.serialize(Serializer::new(&mut *self.graph))?;
        Ok(wrap_variant(self.graph, variant, payload))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec<'g>> {
        Ok(SerializeVec {
            graph: self.graph,
            class: None,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec<'g>> {
        ser::Serializer::serialize_seq(self, Some(len))
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SerializeVec<'g>> {
        Ok(SerializeVec {
            graph: self.graph,
            class: Some(name.to_string()),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant<'g>> {
        Ok(SerializeTupleVariant {
            graph: self.graph,
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap<'g>> {
        Ok(SerializeMap {
            graph: self.graph,
            class: None,
            map: TaxiMap::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeMap<'g>> {
        Ok(SerializeMap {
            graph: self.graph,
            class: Some(name.to_string()),
            map: TaxiMap::with_capacity(len),
            next_key: None,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant<'g>> {
        Ok(SerializeStructVariant {
            graph: self.graph,
            variant,
            map: TaxiMap::with_capacity(len),
        })
    }
}

pub(crate) struct SerializeVec<'g> {
    graph: &'g mut Graph,
    class: Option<String>,
    items: Vec<Value>,
}

impl SerializeVec<'_> {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let item = value.serialize(Serializer::new(&mut *self.graph))?;
        self.items.push(item);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Node(self.graph.insert(Node {
            kind: crate::NodeKind::Sequence(self.items),
            class: self.class,
        }))
    }
}

impl ser::SerializeSeq for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

pub(crate) struct SerializeTupleVariant<'g> {
    graph: &'g mut Graph,
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let item = value.serialize(Serializer::new(&mut *self.graph))?;
        self.items.push(item);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let payload = Value::Node(self.graph.insert(Node::sequence(self.items)));
        Ok(wrap_variant(self.graph, self.variant, payload))
    }
}

pub(crate) struct SerializeMap<'g> {
    graph: &'g mut Graph,
    class: Option<String>,
    map: TaxiMap,
    next_key: Option<String>,
}

impl SerializeMap<'_> {
    fn finish(self) -> Value {
        Value::Node(self.graph.insert(Node {
            kind: crate::NodeKind::Mapping(self.map),
            class: self.class,
        }))
    }
}

impl ser::SerializeMap for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        let value = value.serialize(Serializer::new(&mut *self.graph))?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(Serializer::new(&mut *self.graph))?;
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

pub(crate) struct SerializeStructVariant<'g> {
    graph: &'g mut Graph,
    variant: &'static str,
    map: TaxiMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(Serializer::new(&mut *self.graph))?;
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let payload = Value::Node(self.graph.insert(Node::mapping(self.map)));
        Ok(wrap_variant(self.graph, self.variant, payload))
    }
}

/// Mapping keys are plain strings; this turns scalar-like keys into one.
struct MapKeySerializer;

fn key_must_be_a_string() -> Error {
    Error::unsupported_type("map keys must be strings, numbers, chars or bools")
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(key_must_be_a_string())
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(key_must_be_a_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_must_be_a_string())
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_must_be_a_string())
    }

    fn serialize_some<T>(self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_must_be_a_string())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_must_be_a_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_a_string())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_a_string())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_a_string())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_a_string())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_a_string())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_a_string())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_a_string())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_a_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_graph;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Pair(u8, char);

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect { w: u32, h: u32 },
    }

    #[test]
    fn test_tuple_struct_class() {
        let graph = to_graph(&Pair(7, 'x')).unwrap();
        let root = graph.resolve(graph.root()).unwrap();
        assert_eq!(root.class(), Some("Pair"));
        let items = root.as_sequence().unwrap();
        assert_eq!(items[0].as_str(), Some("7"));
        assert_eq!(items[1].as_str(), Some("x"));
    }

    #[test]
    fn test_option_and_unit_are_absent() {
        assert!(to_graph(&None::<u8>).unwrap().root().is_absent());
        assert!(to_graph(&()).unwrap().root().is_absent());
        assert_eq!(to_graph(&Some("")).unwrap().root().as_str(), Some(""));
        assert!(to_graph(&Some(None::<u8>)).unwrap().root().is_absent());
        assert!(to_graph(&Some(())).unwrap().root().is_absent());
    }

    #[test]
    fn test_enum_variants() {
        let graph = to_graph(&Shape::Empty).unwrap();
        assert_eq!(graph.root().as_str(), Some("Empty"));

        let graph = to_graph(&Shape::Circle(1.5)).unwrap();
        let root = graph.resolve(graph.root()).unwrap().as_mapping().unwrap();
        assert_eq!(root.get("Circle").and_then(|v| v.as_str()), Some("1.5"));

        let graph = to_graph(&Shape::Rect { w: 2, h: 3 }).unwrap();
        let outer = graph.resolve(graph.root()).unwrap().as_mapping().unwrap();
        let inner = graph.resolve(outer.get("Rect").unwrap()).unwrap();
        assert_eq!(inner.as_mapping().unwrap().len(), 2);
    }

    #[test]
    fn test_numeric_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(2u32, "two");
        map.insert(10u32, "ten");
        let graph = to_graph(&map).unwrap();
        let root = graph.resolve(graph.root()).unwrap().as_mapping().unwrap();
        assert_eq!(root.get("10").and_then(|v| v.as_str()), Some("ten"));
    }

    #[test]
    fn test_compound_map_keys_rejected() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "x");
        assert!(matches!(to_graph(&map), Err(Error::UnsupportedType(_))));
    }
}
