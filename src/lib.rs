//! # serde_taxi
//!
//! Reads and writes Taxi, a deterministic tagged-text encoding for object graphs
//! that keeps shared references shared and survives cycles.
//!
//! ## What is Taxi?
//!
//! A Taxi document is a tree of tags: `hashref` for mappings, `arrayref` for
//! sequences, `scalarref` for single-value boxes and `scalar` for leaf text.
//! Every container gets a serial id. When the encoder reaches a container it has
//! already written, it emits a short `redundant` stub instead of writing it
//! again, and the decoder turns that stub back into the same node.
//!
//! ```text
//! <taxi ver="1.00">
//! 	<hashref id="0">
//! 		<scalar name="name" value="Miko"/>
//! 		<hashref name="dataformat" id="1">
//! 			<scalar name="type" value="taxi"/>
//! 		</hashref>
//! 		<hashref name="otherdataformat" id="1" redundant="1"/>
//! 	</hashref>
//! </taxi>
//! ```
//!
//! ## Key Features
//!
//! - **Identity Preserving**: Aliased nodes decode to one node, not copies
//! - **Cycle Safe**: Self-referencing structures encode to a finite document
//! - **Class Names**: Containers carry an optional opaque type name
//! - **Serde Compatible**: Any `Serialize`/`Deserialize` type converts through a [`Graph`]
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ### Graphs
//!
//! ```rust
//! use serde_taxi::{decode, encode, Graph, Node, TaxiMap, Value};
//!
//! let mut graph = Graph::new();
//! let format = graph.insert(Node::mapping(TaxiMap::new()).with_class("Format"));
//!
//! let mut entries = TaxiMap::new();
//! entries.insert("dataformat".to_string(), Value::from(format));
//! entries.insert("otherdataformat".to_string(), Value::from(format));
//! let root = graph.insert(Node::mapping(entries));
//! graph.set_root(root);
//!
//! let taxi = encode(&graph).unwrap();
//! let back = decode(&taxi).unwrap();
//!
//! let map = back.resolve(back.root()).and_then(|n| n.as_mapping()).unwrap();
//! assert_eq!(map.get("dataformat"), map.get("otherdataformat"));
//! assert!(back.is_isomorphic(&graph));
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_taxi::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Student {
//!     name: String,
//!     schools: Vec<String>,
//! }
//!
//! let miko = Student {
//!     name: "Miko".to_string(),
//!     schools: vec!["Cardinal Forest".to_string(), "Robinson".to_string()],
//! };
//!
//! let taxi = to_string(&miko).unwrap();
//! assert!(taxi.contains("class=\"Student\""));
//!
//! let back: Student = from_str(&taxi).unwrap();
//! assert_eq!(back, miko);
//! ```
//!
//! ## Logging
//!
//! Encoding and decoding emit `tracing` events at `debug` (sizes and node counts)
//! and `trace` (back-reference resolution). The library never installs a subscriber.
//!
//! ## Document Format
//!
//! See the [`format`] module for the grammar.

pub mod de;
pub mod decode;
pub mod encode;
pub mod error;
pub mod escape;
pub mod format;
pub mod map;
pub mod options;
pub mod ser;
pub mod value;

pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{Error, Result};
pub use format::{FormatRegistry, FORMAT_VERSION};
pub use map::TaxiMap;
pub use options::TaxiOptions;
pub use value::{Graph, Node, NodeId, NodeKind, Value};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

/// Encode a graph as a Taxi document with default options.
///
/// # Errors
///
/// Returns [`Error::DanglingNode`] if a reachable handle is not owned by `graph`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(graph: &Graph) -> Result<String> {
    encode_with_options(graph, TaxiOptions::default())
}

/// Encode a graph as a Taxi document with custom layout options.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::{encode_with_options, Graph, TaxiOptions};
///
/// let graph = Graph::from_scalar(Some("x".to_string()));
/// let taxi = encode_with_options(&graph, TaxiOptions::compact()).unwrap();
/// assert_eq!(taxi, "<taxi ver=\"1.00\"><scalar value=\"x\"/></taxi>");
/// ```
///
/// # Errors
///
/// Returns [`Error::DanglingNode`] if a reachable handle is not owned by `graph`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options(graph: &Graph, options: TaxiOptions) -> Result<String> {
    Encoder::new(graph, options).encode()
}

/// Decode a Taxi document written in the current format version.
///
/// # Errors
///
/// Fails with [`Error::UnsupportedVersion`], [`Error::UnrecognizedTag`],
/// [`Error::Malformed`] or [`Error::UnexpectedEof`]. Nothing is returned on failure.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(input: &str) -> Result<Graph> {
    decode_with_registry(input, &FormatRegistry::default())
}

/// Decode a Taxi document, accepting the versions in `registry`.
///
/// # Errors
///
/// See [`decode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_registry(input: &str, registry: &FormatRegistry) -> Result<Graph> {
    Decoder::new(input, registry).decode()
}

/// Convert any `T: Serialize` into a [`Graph`].
///
/// # Examples
///
/// ```rust
/// use serde_taxi::to_graph;
///
/// let graph = to_graph(&vec![1, 2, 3]).unwrap();
/// let items = graph.resolve(graph.root()).and_then(|n| n.as_sequence()).unwrap();
/// assert_eq!(items.len(), 3);
/// ```
///
/// # Errors
///
/// Returns an error for map keys that are not strings, numbers, chars or bools,
/// or when the value's `Serialize` impl fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_graph<T>(value: &T) -> Result<Graph>
where
    T: ?Sized + Serialize,
{
    let mut graph = Graph::new();
    let root = value.serialize(ser::Serializer::new(&mut graph))?;
    graph.set_root(root);
    Ok(graph)
}

/// Build a `T: Deserialize` from a [`Graph`].
///
/// # Errors
///
/// Returns an error if the graph's shape does not fit `T`, [`Error::Cycle`]
/// if a cycle is reached, or [`Error::VisitLimit`] / [`Error::DepthLimit`] when
/// the value would be too large or too deep.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_graph<'de, T>(graph: &'de Graph) -> Result<T>
where
    T: Deserialize<'de>,
{
    from_graph_with_limit(graph, de::default_visit_limit(graph))
}

/// Build a `T: Deserialize` from a [`Graph`], entering at most `limit` containers.
///
/// A shared node is copied once per path that reaches it, so this bounds the
/// work a small but heavily shared graph can cause.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::{from_graph_with_limit, to_graph, Error};
///
/// let graph = to_graph(&vec![vec![1], vec![2]]).unwrap();
/// assert!(from_graph_with_limit::<Vec<Vec<u8>>>(&graph, 3).is_ok());
/// assert!(matches!(
///     from_graph_with_limit::<Vec<Vec<u8>>>(&graph, 2),
///     Err(Error::VisitLimit { limit: 2 })
/// ));
/// ```
///
/// # Errors
///
/// As [`from_graph`], plus [`Error::VisitLimit`] once the budget is spent.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_graph_with_limit<'de, T>(graph: &'de Graph, limit: usize) -> Result<T>
where
    T: Deserialize<'de>,
{
    let mut walk = de::Walk::new(limit);
    T::deserialize(de::Deserializer::new(graph, graph.root(), &mut walk))
}

/// Serialize any `T: Serialize` to a Taxi string.
///
/// # Errors
///
/// Returns an error if the value cannot be converted to a graph.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, TaxiOptions::default())
}

/// Serialize any `T: Serialize` to a Taxi string with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be converted to a graph.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: TaxiOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let graph = to_graph(value)?;
    encode_with_options(&graph, options)
}

/// Serialize any `T: Serialize` to a writer in Taxi format.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &("a", "b")).unwrap();
/// assert!(buffer.starts_with(b"<taxi"));
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, TaxiOptions::default())
}

/// Serialize any `T: Serialize` to a writer in Taxi format with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: TaxiOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let taxi = to_string_with_options(value, options)?;
    writer
        .write_all(taxi.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from a Taxi string.
///
/// # Errors
///
/// Returns an error if the input is not a valid Taxi document or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let graph = decode(s)?;
    from_graph(&graph)
}

/// Deserialize an instance of type `T` from bytes of Taxi text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid Taxi, or do not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Deserialize an instance of type `T` from an I/O stream of Taxi.
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid Taxi, or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}
