//! The in-memory object graph.
//!
//! A [`Graph`] is an arena of aliasable [`Node`]s addressed by [`NodeId`] handles,
//! plus a root [`Value`]. A value is either a scalar (present or absent text) or
//! a reference to a node. Two references holding the same `NodeId` point at the
//! same node: that is how sharing and cycles are expressed.
//!
//! ## Core Types
//!
//! - [`Value`]: a slot in the graph, `Scalar(Option<String>)` or `Node(NodeId)`
//! - [`Node`]: a Sequence, Mapping or Box, with an optional class name
//! - [`Graph`]: owns every node and the root
//!
//! ## Building a Graph
//!
//! ```rust
//! use serde_taxi::{Graph, Node, TaxiMap, Value};
//!
//! let mut graph = Graph::new();
//! let schools = graph.insert(Node::sequence(vec![
//!     Value::from("Cardinal Forest"),
//!     Value::from("Robinson"),
//! ]));
//!
//! let mut person = TaxiMap::new();
//! person.insert("name".to_string(), Value::from("Miko"));
//! person.insert("schools".to_string(), Value::from(schools));
//! let root = graph.insert(Node::mapping(person).with_class("Person"));
//! graph.set_root(root);
//!
//! assert_eq!(graph.len(), 2);
//! ```
//!
//! ## Sharing and Cycles
//!
//! ```rust
//! use serde_taxi::{Graph, Node, Value};
//!
//! // A box that contains itself
//! let mut graph = Graph::new();
//! let cell = graph.insert(Node::boxed(Value::absent()));
//! graph.set_box_content(cell, Value::from(cell)).unwrap();
//! graph.set_root(cell);
//! ```

use crate::{Error, Result, TaxiMap};
use std::collections::HashMap;
use std::fmt;

/// Handle to a node inside one [`Graph`].
///
/// Handles are only meaningful for the graph that issued them. Comparing two
/// handles compares node identity, not contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena slot of this handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A slot in the graph: scalar text or a reference to an aliasable node.
///
/// Scalars have no identity. Equal scalar text at two positions is never shared.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::Value;
///
/// let text = Value::from("hello");
/// let absent = Value::absent();
///
/// assert_eq!(text.as_str(), Some("hello"));
/// assert!(absent.is_absent());
/// assert_ne!(Value::from(""), absent);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Scalar(Option<String>),
    Node(NodeId),
}

impl Default for Value {
    fn default() -> Self {
        Value::absent()
    }
}

impl Value {
    /// An absent scalar, distinct from the empty string.
    #[inline]
    #[must_use]
    pub const fn absent() -> Self {
        Value::Scalar(None)
    }

    /// Returns `true` if this is a scalar (present or absent).
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Returns `true` if this is the absent scalar.
    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Value::Scalar(None))
    }

    /// If the value is present scalar text, returns it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Some(s)) => Some(s),
            _ => None,
        }
    }

    /// If the value references a node, returns its handle.
    #[inline]
    #[must_use]
    pub const fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            Value::Scalar(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Some(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Some(value))
    }
}

impl From<NodeId> for Value {
    fn from(value: NodeId) -> Self {
        Value::Node(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::absent(), Into::into)
    }
}

/// The structural variant of a node together with its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Sequence(Vec<Value>),
    Mapping(TaxiMap),
    Box(Value),
}

impl NodeKind {
    /// Lower-case variant name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Box(_) => "box",
        }
    }
}

/// An aliasable node: a Sequence, Mapping or Box with an optional class name.
///
/// The class name is opaque to this crate; it is round-tripped untouched so the
/// application can rebuild its own typed objects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub class: Option<String>,
}

impl Node {
    /// Creates an unclassed Sequence.
    #[must_use]
    pub fn sequence(items: Vec<Value>) -> Self {
        Node {
            kind: NodeKind::Sequence(items),
            class: None,
        }
    }

    /// Creates an unclassed Mapping.
    #[must_use]
    pub fn mapping(entries: TaxiMap) -> Self {
        Node {
            kind: NodeKind::Mapping(entries),
            class: None,
        }
    }

    /// Creates an unclassed Box holding `content`.
    #[must_use]
    pub fn boxed(content: Value) -> Self {
        Node {
            kind: NodeKind::Box(content),
            class: None,
        }
    }

    /// Sets the class name.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Returns the class name, if any.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Returns the items if this is a Sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a Mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&TaxiMap> {
        match &self.kind {
            NodeKind::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the content if this is a Box.
    #[must_use]
    pub fn as_box(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Box(content) => Some(content),
            _ => None,
        }
    }
}

/// An object graph: an arena of nodes plus a root value.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::{Graph, Node, Value};
///
/// let mut graph = Graph::new();
/// let shared = graph.insert(Node::sequence(vec![Value::from("x")]));
/// let pair = graph.insert(Node::sequence(vec![Value::from(shared), Value::from(shared)]));
/// graph.set_root(pair);
///
/// let items = graph.node(pair).and_then(|n| n.as_sequence()).unwrap();
/// assert_eq!(items[0], items[1]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    root: Value,
}

impl Graph {
    /// Creates an empty graph whose root is the absent scalar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with no nodes and the given scalar text as root.
    #[must_use]
    pub fn from_scalar(text: Option<String>) -> Self {
        Graph {
            nodes: Vec::new(),
            root: Value::Scalar(text),
        }
    }

    /// Moves `node` into the arena and returns its handle.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Follows a value to its node. Scalars and dangling handles yield `None`.
    #[must_use]
    pub fn resolve(&self, value: &Value) -> Option<&Node> {
        value.as_node().and_then(|id| self.node(id))
    }

    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<Value>) {
        self.root = root.into();
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node with its handle, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Appends `value` to the Sequence `id`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is dangling or does not name a Sequence.
    pub fn push(&mut self, id: NodeId, value: Value) -> Result<()> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Sequence(items)) => {
                items.push(value);
                Ok(())
            }
            Some(other) => Err(Error::custom(format!(
                "cannot push onto {} node {}",
                other.name(),
                id
            ))),
            None => Err(Error::DanglingNode(id)),
        }
    }

    /// Inserts `key` into the Mapping `id`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Fails if `id` is dangling or does not name a Mapping.
    pub fn insert_entry(&mut self, id: NodeId, key: String, value: Value) -> Result<Option<Value>> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Mapping(map)) => Ok(map.insert(key, value)),
            Some(other) => Err(Error::custom(format!(
                "cannot insert a key into {} node {}",
                other.name(),
                id
            ))),
            None => Err(Error::DanglingNode(id)),
        }
    }

    /// Replaces the content of the Box `id`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is dangling or does not name a Box.
    pub fn set_box_content(&mut self, id: NodeId, value: Value) -> Result<Value> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Box(content)) => Ok(std::mem::replace(content, value)),
            Some(other) => Err(Error::custom(format!(
                "cannot set the content of {} node {}",
                other.name(),
                id
            ))),
            None => Err(Error::DanglingNode(id)),
        }
    }

    /// Returns `true` when both graphs have the same shape reachable from their
    /// roots: same variants, class names, scalar text, key sets and sequence
    /// order, AND the same sharing. A node reached twice in `self` must
    /// correspond to a node reached twice in `other`.
    ///
    /// Terminates on cyclic graphs. Handle values and unreachable nodes are
    /// ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_taxi::{Graph, Node, Value};
    ///
    /// let mut shared = Graph::new();
    /// let leaf = shared.insert(Node::sequence(vec![]));
    /// let root = shared.insert(Node::sequence(vec![Value::from(leaf), Value::from(leaf)]));
    /// shared.set_root(root);
    ///
    /// let mut copied = Graph::new();
    /// let a = copied.insert(Node::sequence(vec![]));
    /// let b = copied.insert(Node::sequence(vec![]));
    /// let root = copied.insert(Node::sequence(vec![Value::from(a), Value::from(b)]));
    /// copied.set_root(root);
    ///
    /// assert!(shared.is_isomorphic(&shared.clone()));
    /// assert!(!shared.is_isomorphic(&copied));
    /// ```
    #[must_use]
    pub fn is_isomorphic(&self, other: &Graph) -> bool {
        let mut forward: HashMap<NodeId, NodeId> = HashMap::new();
        let mut backward: HashMap<NodeId, NodeId> = HashMap::new();
        let mut pending = vec![(&self.root, &other.root)];

        while let Some((left, right)) = pending.pop() {
            let (a, b) = match (left, right) {
                (Value::Scalar(x), Value::Scalar(y)) => {
                    if x != y {
                        return false;
                    }
                    continue;
                }
                (Value::Node(a), Value::Node(b)) => (*a, *b),
                _ => return false,
            };

            match (forward.get(&a), backward.get(&b)) {
                (Some(seen), _) if *seen == b => continue,
                (None, None) => {
                    forward.insert(a, b);
                    backward.insert(b, a);
                }
                _ => return false,
            }

            let (Some(na), Some(nb)) = (self.node(a), other.node(b)) else {
                return false;
            };
            if na.class != nb.class {
                return false;
            }

            match (&na.kind, &nb.kind) {
                (NodeKind::Sequence(xs), NodeKind::Sequence(ys)) => {
                    if xs.len() != ys.len() {
                        return false;
                    }
                    pending.extend(xs.iter().zip(ys.iter()));
                }
                (NodeKind::Mapping(xm), NodeKind::Mapping(ym)) => {
                    if xm.len() != ym.len() {
                        return false;
                    }
                    for (key, x) in xm.iter() {
                        match ym.get(key) {
                            Some(y) => pending.push((x, y)),
                            None => return false,
                        }
                    }
                }
                (NodeKind::Box(x), NodeKind::Box(y)) => pending.push((x, y)),
                _ => return false,
            }
        }

        true
    }
}
