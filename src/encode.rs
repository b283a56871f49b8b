//! Graph to text.
//!
//! The [`Encoder`] walks a [`Graph`] depth-first from its root. Pending children
//! and close tags live on an explicit work stack, so nesting depth is bounded
//! only by memory. The first visit to a node writes it in full and assigns it the
//! next serial id; every later visit writes a self-closed `redundant` stub naming
//! that id and does not descend. Cycles therefore end at the first revisit.
//!
//! ```rust
//! use serde_taxi::{encode, Graph, Node, Value};
//!
//! let mut graph = Graph::new();
//! let cell = graph.insert(Node::boxed(Value::absent()));
//! graph.set_box_content(cell, Value::from(cell)).unwrap();
//! graph.set_root(cell);
//!
//! let taxi = encode(&graph).unwrap();
//! assert_eq!(
//!     taxi,
//!     "<taxi ver=\"1.00\">\n\t<scalarref id=\"0\">\n\t\t<scalarref id=\"0\" redundant=\"1\"/>\n\t</scalarref>\n</taxi>\n"
//! );
//! ```

use crate::escape::escape;
use crate::format::{TagKind, FORMAT_VERSION, XML_DECLARATION};
use crate::{Error, Graph, NodeId, NodeKind, Result, TaxiOptions, Value};
use tracing::debug;

/// One pending piece of output. Children are pushed in reverse so they pop in
/// document order, after which the parent's `Close` pops.
enum Work<'g> {
    Value {
        value: &'g Value,
        name: Option<&'g str>,
        depth: usize,
    },
    Close {
        tag: &'static str,
        depth: usize,
    },
}

/// Writes one graph as a Taxi document.
pub struct Encoder<'g> {
    graph: &'g Graph,
    options: TaxiOptions,
    output: String,
    // serial id per arena slot, assigned on first visit
    ids: Vec<Option<usize>>,
    next_id: usize,
    work: Vec<Work<'g>>,
}

impl<'g> Encoder<'g> {
    pub fn new(graph: &'g Graph, options: TaxiOptions) -> Self {
        Encoder {
            graph,
            options,
            output: String::with_capacity(256),
            ids: vec![None; graph.len()],
            next_id: 0,
            work: Vec::new(),
        }
    }

    /// Consumes the encoder and returns the finished document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingNode`] if a reachable handle is not owned by the graph.
    pub fn encode(mut self) -> Result<String> {
        debug!(nodes = self.graph.len(), "encoding graph");

        if self.options.declaration {
            self.output.push_str(XML_DECLARATION);
            self.write_newline();
        }

        self.output.push('<');
        self.output.push_str(TagKind::Document.keyword());
        self.write_attr("ver", FORMAT_VERSION);
        self.output.push('>');
        self.write_newline();

        let root = self.graph.root();
        self.work.push(Work::Value {
            value: root,
            name: None,
            depth: 1,
        });
        while let Some(work) = self.work.pop() {
            match work {
                Work::Value { value, name, depth } => self.write_value(value, name, depth)?,
                Work::Close { tag, depth } => self.write_close(tag, depth),
            }
        }

        self.write_close(TagKind::Document.keyword(), 0);

        debug!(
            bytes = self.output.len(),
            ids = self.next_id,
            "encoded graph"
        );
        Ok(self.output)
    }

    fn write_newline(&mut self) {
        if self.options.pretty {
            self.output.push('\n');
        }
    }

    fn write_indent(&mut self, depth: usize) {
        if self.options.pretty {
            for _ in 0..depth {
                self.output.push_str(&self.options.indent);
            }
        }
    }

    fn write_attr(&mut self, key: &str, value: &str) {
        self.output.push(' ');
        self.output.push_str(key);
        self.output.push_str("=\"");
        self.output.push_str(&escape(value));
        self.output.push('"');
    }

    fn write_close(&mut self, tag: &str, depth: usize) {
        self.write_indent(depth);
        self.output.push_str("</");
        self.output.push_str(tag);
        self.output.push('>');
        self.write_newline();
    }

    fn write_value(&mut self, value: &'g Value, name: Option<&'g str>, depth: usize) -> Result<()> {
        match value {
            Value::Scalar(text) => {
                self.write_indent(depth);
                self.output.push('<');
                self.output.push_str(TagKind::Scalar.keyword());
                if let Some(name) = name {
                    self.write_attr("name", name);
                }
                if let Some(text) = text {
                    self.write_attr("value", text);
                }
                self.output.push_str("/>");
                self.write_newline();
                Ok(())
            }
            Value::Node(id) => self.write_node(*id, name, depth),
        }
    }

    /// Writes the open tag of `id`, or its stub on a revisit, and schedules the
    /// children and close tag.
    fn write_node(&mut self, id: NodeId, name: Option<&'g str>, depth: usize) -> Result<()> {
        let graph = self.graph;
        let node = graph.node(id).ok_or(Error::DanglingNode(id))?;
        let tag = TagKind::of(&node.kind).keyword();

        self.write_indent(depth);
        self.output.push('<');
        self.output.push_str(tag);
        if let Some(name) = name {
            self.write_attr("name", name);
        }

        if let Some(serial) = self.ids[id.index()] {
            self.write_attr("id", &serial.to_string());
            self.write_attr("redundant", "1");
            self.output.push_str("/>");
            self.write_newline();
            return Ok(());
        }

        let serial = self.next_id;
        self.next_id += 1;
        self.ids[id.index()] = Some(serial);

        self.write_attr("id", &serial.to_string());
        if let Some(class) = node.class() {
            self.write_attr("class", class);
        }
        self.output.push('>');
        self.write_newline();

        self.work.push(Work::Close { tag, depth });
        let depth = depth + 1;
        match &node.kind {
            NodeKind::Sequence(items) => {
                self.work.extend(items.iter().rev().map(|value| Work::Value {
                    value,
                    name: None,
                    depth,
                }));
            }
            NodeKind::Mapping(entries) => {
                self.work
                    .extend(entries.iter().rev().map(|(key, value)| Work::Value {
                        value,
                        name: Some(key.as_str()),
                        depth,
                    }));
            }
            NodeKind::Box(content) => self.work.push(Work::Value {
                value: content,
                name: None,
                depth,
            }),
        }
        Ok(())
    }
}
