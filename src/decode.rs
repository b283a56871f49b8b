//! Text to graph.
//!
//! The [`Decoder`] reads tags one at a time and builds the graph with an explicit
//! stack of open containers. The wrapper tag is a header: it is checked for its
//! version and never pushed, so the stack only ever holds the root and its
//! descendants.
//!
//! ## Back-references
//!
//! A node with an `id` is registered before any of its children are read, so a
//! child can refer back to an ancestor. Any later tag carrying an id that is
//! already registered resolves to the node built for it, whatever variant or
//! class the later tag declares.
//!
//! ```rust
//! use serde_taxi::decode;
//!
//! let graph = decode(
//!     "<taxi ver=\"1.00\">\n\
//!      <arrayref id=\"0\">\n\
//!        <arrayref id=\"0\" redundant=\"1\"/>\n\
//!      </arrayref>\n\
//!      </taxi>\n",
//! )
//! .unwrap();
//!
//! let root = graph.root().as_node().unwrap();
//! let items = graph.node(root).and_then(|n| n.as_sequence()).unwrap();
//! assert_eq!(items[0].as_node(), Some(root));
//! ```
//!
//! ## Termination
//!
//! Decoding stops at the first of two conditions:
//!
//! - the root's close tag empties the stack
//! - a self-closing tag arrives while the stack is empty: that tag is the root
//!
//! Anything after that point, the wrapper's `</taxi>` included, is not read.
//! Running out of input first is an error, and so is a close tag that arrives
//! while the stack is empty.

use crate::escape::unescape;
use crate::format::TagKind;
use crate::{Error, FormatRegistry, Graph, Node, NodeId, NodeKind, Result, TaxiMap, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Attributes of one tag, in document order, already unescaped.
#[derive(Debug, Default)]
struct Attributes<'a>(Vec<(&'a str, Cow<'a, str>)>);

impl Attributes<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| &**v)
    }
}

#[derive(Debug)]
struct RawTag<'a> {
    keyword: &'a str,
    closing: bool,
    self_closing: bool,
    attrs: Attributes<'a>,
    line: usize,
    col: usize,
}

impl RawTag<'_> {
    fn serial_id(&self) -> Result<Option<usize>> {
        self.attrs
            .get("id")
            .map(|raw| {
                raw.trim().parse::<usize>().map_err(|_| {
                    Error::malformed(self.line, self.col, &format!("invalid id \"{}\"", raw))
                })
            })
            .transpose()
    }
}

/// Splits the input into tags, tracking line and column for error messages.
struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    started: bool,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            line: 1,
            column: 1,
            started: false,
        }
    }

    fn advance_to(&mut self, end: usize) {
        let input = self.input;
        for ch in input[self.position..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position = end;
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let skipped = rest.len() - rest.trim_start().len();
        self.advance_to(self.position + skipped);
    }

    fn next_tag(&mut self) -> Result<Option<RawTag<'a>>> {
        loop {
            self.skip_whitespace();
            if self.position >= self.input.len() {
                return Ok(None);
            }

            let (line, col) = (self.line, self.column);
            let input = self.input;
            let rest = &input[self.position..];
            if !rest.starts_with('<') {
                return Err(Error::malformed(line, col, "unexpected text between tags"));
            }
            let end = rest
                .find('>')
                .ok_or_else(|| Error::unexpected_eof(line, col, "'>' to close the tag"))?;
            let body = &rest[1..end];
            self.advance_to(self.position + end + 1);

            if body.starts_with('?') {
                if self.started {
                    return Err(Error::malformed(
                        line,
                        col,
                        "declarations are only allowed before the document tag",
                    ));
                }
                continue;
            }

            self.started = true;
            return parse_tag(body, line, col).map(Some);
        }
    }
}

fn parse_tag(body: &str, line: usize, col: usize) -> Result<RawTag<'_>> {
    if let Some(name) = body.strip_prefix('/') {
        let keyword = name.trim();
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(Error::malformed(line, col, "malformed close tag"));
        }
        return Ok(RawTag {
            keyword,
            closing: true,
            self_closing: false,
            attrs: Attributes::default(),
            line,
            col,
        });
    }

    let mut body = body.trim_end();
    let self_closing = match body.strip_suffix('/') {
        Some(inner) => {
            body = inner;
            true
        }
        None => false,
    };

    let keyword_end = body.find(char::is_whitespace).unwrap_or(body.len());
    let keyword = &body[..keyword_end];
    if keyword.is_empty() {
        return Err(Error::malformed(line, col, "missing tag keyword"));
    }

    Ok(RawTag {
        keyword,
        closing: false,
        self_closing,
        attrs: parse_attributes(&body[keyword_end..], line, col)?,
        line,
        col,
    })
}

fn parse_attributes(mut rest: &str, line: usize, col: usize) -> Result<Attributes<'_>> {
    let mut attrs = Attributes::default();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(attrs);
        }

        let eq = rest
            .find('=')
            .ok_or_else(|| Error::malformed(line, col, "attribute without a value"))?;
        let key = &rest[..eq];
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(Error::malformed(
                line,
                col,
                &format!("invalid attribute name \"{}\"", key.trim()),
            ));
        }

        rest = rest[eq + 1..]
            .strip_prefix('"')
            .ok_or_else(|| Error::malformed(line, col, "attribute values must be double-quoted"))?;
        let close = rest
            .find('"')
            .ok_or_else(|| Error::malformed(line, col, "unterminated attribute value"))?;

        if attrs.get(key).is_some() {
            return Err(Error::malformed(
                line,
                col,
                &format!("duplicate attribute \"{}\"", key),
            ));
        }
        attrs.0.push((key, unescape(&rest[..close])));
        rest = &rest[close + 1..];
    }
}

/// A container whose close tag has not been read yet.
struct Frame {
    id: NodeId,
    tag: TagKind,
    filled: bool,
}

/// Result of feeding one tag to the decoder.
enum Step {
    Pending,
    /// The root's close tag emptied the stack.
    RootClosed(Value),
    /// A self-closing tag arrived with the stack empty; it is the whole document.
    SelfClosedRoot(Value),
}

/// Builds a [`Graph`] from a Taxi document.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::{Decoder, FormatRegistry};
///
/// let registry = FormatRegistry::new().with_version("0.90");
/// let graph = Decoder::new("<taxi ver=\"0.90\"><scalar value=\"hi\"/></taxi>", &registry)
///     .decode()
///     .unwrap();
/// assert_eq!(graph.root().as_str(), Some("hi"));
/// ```
pub struct Decoder<'a> {
    lexer: Lexer<'a>,
    registry: &'a FormatRegistry,
    graph: Graph,
    stack: Vec<Frame>,
    backrefs: HashMap<usize, Value>,
    started: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a str, registry: &'a FormatRegistry) -> Self {
        Decoder {
            lexer: Lexer::new(input),
            registry,
            graph: Graph::new(),
            stack: Vec::new(),
            backrefs: HashMap::new(),
            started: false,
        }
    }

    /// Reads the document and returns the graph it describes.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedVersion`] if the wrapper's `ver` is missing or unknown
    /// - [`Error::UnrecognizedTag`] for an unknown tag keyword
    /// - [`Error::Malformed`] / [`Error::UnexpectedEof`] for structural problems
    pub fn decode(mut self) -> Result<Graph> {
        debug!(bytes = self.lexer.input.len(), "decoding document");

        loop {
            let tag = match self.lexer.next_tag()? {
                Some(tag) => tag,
                None => return Err(self.end_of_input()),
            };

            match self.step(tag)? {
                Step::Pending => {}
                Step::RootClosed(root) | Step::SelfClosedRoot(root) => {
                    self.graph.set_root(root);
                    debug!(
                        nodes = self.graph.len(),
                        ids = self.backrefs.len(),
                        "decoded document"
                    );
                    return Ok(self.graph);
                }
            }
        }
    }

    fn end_of_input(&self) -> Error {
        let expected = match self.stack.last() {
            Some(frame) => format!("</{}>", frame.tag.keyword()),
            None if self.started => "a root node".to_string(),
            None => format!("<{}> document tag", TagKind::Document.keyword()),
        };
        Error::unexpected_eof(self.lexer.line, self.lexer.column, &expected)
    }

    fn step(&mut self, tag: RawTag<'_>) -> Result<Step> {
        if tag.closing {
            return self.close(&tag);
        }

        let kind = TagKind::from_keyword(tag.keyword)
            .ok_or_else(|| Error::unrecognized_tag(tag.line, tag.col, tag.keyword))?;

        if !self.started {
            return self.open_document(kind, &tag);
        }
        if kind == TagKind::Document {
            return Err(Error::unrecognized_tag(tag.line, tag.col, tag.keyword));
        }

        let value = self.build_node(kind, &tag)?;
        if self.stack.is_empty() {
            if tag.self_closing {
                return Ok(Step::SelfClosedRoot(value));
            }
        } else {
            self.attach(value.clone(), &tag)?;
        }

        if !tag.self_closing {
            match (kind, value.as_node()) {
                (TagKind::Scalar, _) => {
                    return Err(Error::malformed(
                        tag.line,
                        tag.col,
                        "scalar tags must be self-closing",
                    ))
                }
                (_, Some(id)) => self.stack.push(Frame {
                    id,
                    tag: kind,
                    filled: false,
                }),
                (_, None) => {
                    return Err(Error::malformed(
                        tag.line,
                        tag.col,
                        "a scalar back-reference cannot hold children",
                    ))
                }
            }
        }

        Ok(Step::Pending)
    }

    fn open_document(&mut self, kind: TagKind, tag: &RawTag<'_>) -> Result<Step> {
        if kind != TagKind::Document {
            return Err(Error::malformed(
                tag.line,
                tag.col,
                &format!(
                    "expected <{}> document tag, found <{}>",
                    TagKind::Document.keyword(),
                    tag.keyword
                ),
            ));
        }

        match tag.attrs.get("ver") {
            Some(version) if self.registry.supports(version) => {}
            other => return Err(Error::unsupported_version(other)),
        }
        if tag.self_closing {
            return Err(Error::malformed(
                tag.line,
                tag.col,
                "the document tag cannot be self-closing",
            ));
        }

        self.started = true;
        Ok(Step::Pending)
    }

    fn close(&mut self, tag: &RawTag<'_>) -> Result<Step> {
        let frame = self.stack.pop().ok_or_else(|| {
            Error::malformed(tag.line, tag.col, "close tag with no open container")
        })?;

        let open = frame.tag.keyword();
        if tag.keyword != open {
            return Err(Error::malformed(
                tag.line,
                tag.col,
                &format!("expected </{}>, found </{}>", open, tag.keyword),
            ));
        }

        if self.stack.is_empty() {
            Ok(Step::RootClosed(Value::Node(frame.id)))
        } else {
            Ok(Step::Pending)
        }
    }

    fn build_node(&mut self, kind: TagKind, tag: &RawTag<'_>) -> Result<Value> {
        let serial = tag.serial_id()?;
        if let Some(serial) = serial {
            if let Some(existing) = self.backrefs.get(&serial) {
                trace!(id = serial, line = tag.line, "resolved back-reference");
                return Ok(existing.clone());
            }
        }

        let class = tag.attrs.get("class").map(str::to_string);
        let value = match kind {
            TagKind::Mapping => Value::Node(self.graph.insert(Node {
                kind: NodeKind::Mapping(TaxiMap::new()),
                class,
            })),
            TagKind::Sequence => Value::Node(self.graph.insert(Node {
                kind: NodeKind::Sequence(Vec::new()),
                class,
            })),
            TagKind::Box => Value::Node(self.graph.insert(Node {
                kind: NodeKind::Box(Value::absent()),
                class,
            })),
            TagKind::Scalar => Value::Scalar(tag.attrs.get("value").map(str::to_string)),
            TagKind::Document => {
                return Err(Error::unrecognized_tag(tag.line, tag.col, tag.keyword))
            }
        };

        if let Some(serial) = serial {
            self.backrefs.insert(serial, value.clone());
        }
        Ok(value)
    }

    fn attach(&mut self, value: Value, tag: &RawTag<'_>) -> Result<()> {
        let Some(frame) = self.stack.last_mut() else {
            return Ok(());
        };

        let id = frame.id;
        let node = self.graph.node_mut(id).ok_or(Error::DanglingNode(id))?;
        match &mut node.kind {
            NodeKind::Mapping(map) => {
                let key = tag.attrs.get("name").ok_or_else(|| {
                    Error::malformed(tag.line, tag.col, "mapping entry without a name")
                })?;
                map.insert(key.to_string(), value);
            }
            NodeKind::Sequence(items) => items.push(value),
            NodeKind::Box(content) => {
                if frame.filled {
                    return Err(Error::malformed(
                        tag.line,
                        tag.col,
                        "a box holds exactly one value",
                    ));
                }
                *content = value;
                frame.filled = true;
            }
        }
        Ok(())
    }
}
