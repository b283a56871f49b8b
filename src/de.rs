//! Serde deserialization out of a [`Graph`].
//!
//! The inverse of [`crate::ser`]: scalar text is parsed on demand for numbers and
//! bools, Sequences feed serde sequences, Mappings feed serde maps and structs,
//! and Boxes are transparent. Class names are ignored; the target type decides.
//!
//! Rust values own their children, so a node shared by two paths is read once
//! per path. A cycle has no owned representation and fails with
//! [`Error::Cycle`].
//!
//! Sharing can make the owned value exponentially larger than the graph, so one
//! conversion may enter at most a fixed number of containers
//! ([`default_visit_limit`] unless [`crate::from_graph_with_limit`] says
//! otherwise) before failing with [`Error::VisitLimit`]. Nesting deeper than
//! [`MAX_DEPTH`] fails with [`Error::DepthLimit`].
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_taxi::{decode, from_graph};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let graph = decode(
//!     "<taxi ver=\"1.00\"><hashref id=\"0\">\
//!      <scalar name=\"x\" value=\"1\"/><scalar name=\"y\" value=\"2\"/>\
//!      </hashref></taxi>",
//! )
//! .unwrap();
//! let point: Point = from_graph(&graph).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```

use crate::{Error, Graph, Node, NodeId, NodeKind, Result, Value};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::str::FromStr;

/// Containers deeper than this fail with [`Error::DepthLimit`].
pub const MAX_DEPTH: usize = 128;

/// The visit budget [`crate::from_graph`] uses for `graph`: sixteen visits per
/// node, and never less than 65536.
#[must_use]
pub fn default_visit_limit(graph: &Graph) -> usize {
    graph.len().saturating_mul(16).max(1 << 16)
}

/// State shared by every deserializer of one conversion.
pub(crate) struct Walk {
    // containers currently being read, outermost first
    path: Vec<NodeId>,
    visited: usize,
    limit: usize,
}

impl Walk {
    pub(crate) fn new(limit: usize) -> Self {
        Walk {
            path: Vec::new(),
            visited: 0,
            limit,
        }
    }

    fn enter(&mut self, id: NodeId) -> Result<()> {
        if self.path.contains(&id) {
            return Err(Error::Cycle(id));
        }
        if self.path.len() >= MAX_DEPTH {
            return Err(Error::DepthLimit { limit: MAX_DEPTH });
        }
        self.visited += 1;
        if self.visited > self.limit {
            return Err(Error::VisitLimit { limit: self.limit });
        }
        self.path.push(id);
        Ok(())
    }

    fn leave(&mut self) {
        self.path.pop();
    }
}

/// Reads one slot of a graph.
pub(crate) struct Deserializer<'de, 'p> {
    graph: &'de Graph,
    value: &'de Value,
    walk: &'p mut Walk,
}

impl<'de, 'p> Deserializer<'de, 'p> {
    pub(crate) fn new(graph: &'de Graph, value: &'de Value, walk: &'p mut Walk) -> Self {
        Deserializer { graph, value, walk }
    }

    fn child<'q>(&'q mut self, value: &'de Value) -> Deserializer<'de, 'q> {
        Deserializer {
            graph: self.graph,
            value,
            walk: &mut *self.walk,
        }
    }

    /// Follows Box nodes until a scalar or a non-box node is reached.
    fn unbox(&self) -> Result<&'de Value> {
        let mut value = self.value;
        let mut steps = 0;
        while let Value::Node(id) = value {
            let node = self.graph.node(*id).ok_or(Error::DanglingNode(*id))?;
            match &node.kind {
                NodeKind::Box(content) => {
                    // a chain longer than the arena has revisited a box
                    if steps > self.graph.len() {
                        return Err(Error::Cycle(*id));
                    }
                    steps += 1;
                    value = content;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn enter(&mut self, id: NodeId) -> Result<&'de Node> {
        let node = self.graph.node(id).ok_or(Error::DanglingNode(id))?;
        self.walk.enter(id)?;
        Ok(node)
    }

    fn describe(&self, value: &Value) -> String {
        match value {
            Value::Scalar(None) => "absent scalar".to_string(),
            Value::Scalar(Some(s)) => format!("scalar \"{}\"", s),
            Value::Node(id) => match self.graph.node(*id) {
                Some(node) => format!("{} node", node.kind.name()),
                None => format!("dangling node {}", id),
            },
        }
    }

    fn invalid(&self, value: &Value, expected: &str) -> Error {
        Error::custom(format!(
            "invalid type: expected {}, found {}",
            expected,
            self.describe(value)
        ))
    }

    fn text(&self, expected: &str) -> Result<&'de str> {
        let value = self.unbox()?;
        value.as_str().ok_or_else(|| self.invalid(value, expected))
    }

    fn parse<T: FromStr>(&self, expected: &str) -> Result<T> {
        let text = self.text(expected)?;
        text.trim()
            .parse()
            .map_err(|_| Error::custom(format!("expected {}, found \"{}\"", expected, text)))
    }
}

macro_rules! deserialize_parsed {
    ($method:ident, $visit:ident, $ty:ty, $expected:literal) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            visitor.$visit(self.parse::<$ty>($expected)?)
        }
    };
}

impl<'de> de::Deserializer<'de> for Deserializer<'de, '_> {
    type Error = Error;

    fn deserialize_any<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.unbox()?;
        let id = match value {
            Value::Scalar(None) => return visitor.visit_unit(),
            Value::Scalar(Some(s)) => return visitor.visit_borrowed_str(s),
            Value::Node(id) => *id,
        };

        let node = self.enter(id)?;
        let graph = self.graph;
        let result = match &node.kind {
            NodeKind::Sequence(items) => visitor.visit_seq(SeqAccess {
                graph,
                iter: items.iter(),
                walk: &mut *self.walk,
            }),
            NodeKind::Mapping(map) => visitor.visit_map(MapAccess {
                graph,
                iter: map.iter(),
                value: None,
                walk: &mut *self.walk,
            }),
            // unbox stops only at non-box nodes
            NodeKind::Box(_) => Err(Error::custom("unexpected box")),
        };
        self.walk.leave();
        result
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.text("a bool")?.trim() {
            "true" | "1" => visitor.visit_bool(true),
            "false" | "0" | "" => visitor.visit_bool(false),
            other => Err(Error::custom(format!("expected a bool, found \"{}\"", other))),
        }
    }

    deserialize_parsed!(deserialize_i8, visit_i8, i8, "an integer");
    deserialize_parsed!(deserialize_i16, visit_i16, i16, "an integer");
    deserialize_parsed!(deserialize_i32, visit_i32, i32, "an integer");
    deserialize_parsed!(deserialize_i64, visit_i64, i64, "an integer");
    deserialize_parsed!(deserialize_i128, visit_i128, i128, "an integer");
    deserialize_parsed!(deserialize_u8, visit_u8, u8, "an unsigned integer");
    deserialize_parsed!(deserialize_u16, visit_u16, u16, "an unsigned integer");
    deserialize_parsed!(deserialize_u32, visit_u32, u32, "an unsigned integer");
    deserialize_parsed!(deserialize_u64, visit_u64, u64, "an unsigned integer");
    deserialize_parsed!(deserialize_u128, visit_u128, u128, "an unsigned integer");
    deserialize_parsed!(deserialize_f32, visit_f32, f32, "a float");
    deserialize_parsed!(deserialize_f64, visit_f64, f64, "a float");

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let text = self.text("a char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor.visit_char(ch),
            _ => Err(Error::custom(format!("expected a char, found \"{}\"", text))),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.unbox()?.is_absent() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.unbox()?;
        if value.is_absent() {
            visitor.visit_unit()
        } else {
            Err(self.invalid(value, "an absent scalar"))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        mut self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.unbox()?;
        let id = match value {
            Value::Scalar(Some(s)) => return visitor.visit_enum(s.as_str().into_deserializer()),
            Value::Node(id) => *id,
            Value::Scalar(None) => return Err(self.invalid(value, "an enum")),
        };

        let node = self.enter(id)?;
        let result = match node.as_mapping() {
            Some(map) if map.len() == 1 => {
                let (variant, payload) = map
                    .iter()
                    .next()
                    .ok_or_else(|| Error::custom("empty enum mapping"))?;
                visitor.visit_enum(EnumAccess {
                    variant: variant.as_str(),
                    payload: self.child(payload),
                })
            }
            _ => Err(Error::custom(format!(
                "invalid type: expected a single-key mapping for an enum, found {}",
                self.describe(value)
            ))),
        };
        self.walk.leave();
        result
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        str string bytes byte_buf seq tuple tuple_struct map struct identifier
    }
}

struct SeqAccess<'de, 'p> {
    graph: &'de Graph,
    iter: std::slice::Iter<'de, Value>,
    walk: &'p mut Walk,
}

impl<'de> de::SeqAccess<'de> for SeqAccess<'de, '_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(Deserializer::new(self.graph, value, &mut *self.walk))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapAccess<'de, 'p> {
    graph: &'de Graph,
    iter: indexmap::map::Iter<'de, String, Value>,
    value: Option<&'de Value>,
    walk: &'p mut Walk,
}

impl<'de> de::MapAccess<'de> for MapAccess<'de, '_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer { key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("value requested before key"))?;
        seed.deserialize(Deserializer::new(self.graph, value, &mut *self.walk))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Mapping keys are always text; numeric and bool keys are parsed on request.
struct KeyDeserializer<'de> {
    key: &'de str,
}

macro_rules! deserialize_key {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            let parsed = self.key.parse::<$ty>().map_err(|_| {
                Error::custom(format!(
                    "invalid map key: expected {}, found \"{}\"",
                    stringify!($ty),
                    self.key
                ))
            })?;
            visitor.$visit(parsed)
        }
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.key)
    }

    deserialize_key!(deserialize_bool, visit_bool, bool);
    deserialize_key!(deserialize_i8, visit_i8, i8);
    deserialize_key!(deserialize_i16, visit_i16, i16);
    deserialize_key!(deserialize_i32, visit_i32, i32);
    deserialize_key!(deserialize_i64, visit_i64, i64);
    deserialize_key!(deserialize_i128, visit_i128, i128);
    deserialize_key!(deserialize_u8, visit_u8, u8);
    deserialize_key!(deserialize_u16, visit_u16, u16);
    deserialize_key!(deserialize_u32, visit_u32, u32);
    deserialize_key!(deserialize_u64, visit_u64, u64);
    deserialize_key!(deserialize_u128, visit_u128, u128);
    deserialize_key!(deserialize_char, visit_char, char);

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self.key.into_deserializer())
    }

    forward_to_deserialize_any! {
        f32 f64 str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct EnumAccess<'de, 'p> {
    variant: &'de str,
    payload: Deserializer<'de, 'p>,
}

impl<'de, 'p> de::EnumAccess<'de> for EnumAccess<'de, 'p> {
    type Error = Error;
    type Variant = Deserializer<'de, 'p>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))?;
        Ok((variant, self.payload))
    }
}

impl<'de> de::VariantAccess<'de> for Deserializer<'de, '_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        de::Deserialize::deserialize(self)
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self, visitor)
    }
}
