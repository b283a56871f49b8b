//! Error types for Taxi encoding and decoding.
//!
//! ## Error Categories
//!
//! - **Version Errors**: The document's wrapper tag names a format version the
//!   [`FormatRegistry`](crate::FormatRegistry) does not accept
//! - **Tag Errors**: A tag keyword outside the five the format knows
//! - **Malformed Documents**: Broken tags, bad attributes, unbalanced nesting or
//!   input that ends while containers are still open
//! - **Graph Errors**: Handles that do not belong to the graph being encoded, or
//!   cycles reached while converting a graph into a Rust type
//! - **Limit Errors**: Conversions into Rust types that would nest too deep or
//!   copy shared nodes too many times
//! - **I/O Errors**: Reader/writer failures
//!
//! Every parsing error carries the line and column of the tag that caused it.
//!
//! ## Examples
//!
//! ```rust
//! use serde_taxi::{decode, Error};
//!
//! let result = decode("<taxi ver=\"0.5\"></taxi>");
//! assert!(matches!(result, Err(Error::UnsupportedVersion { .. })));
//! ```

use crate::NodeId;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding Taxi.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The wrapper tag's `ver` attribute is missing or not in the registry
    #[error("Unsupported format version: {}", found.as_deref().unwrap_or("<missing>"))]
    UnsupportedVersion { found: Option<String> },

    /// A tag keyword the format does not define
    #[error("Unrecognized tag <{tag}> at line {line}, column {col}")]
    UnrecognizedTag {
        line: usize,
        col: usize,
        tag: String,
    },

    /// Structurally invalid document
    #[error("Invalid data format at line {line}, column {col}: {msg}")]
    Malformed {
        line: usize,
        col: usize,
        msg: String,
    },

    /// Input ended before the document was closed
    #[error("Invalid data format: unexpected end of input at line {line}, column {col}\nExpected: {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
    },

    /// A handle that is not owned by the graph being walked
    #[error("Node {0} does not belong to this graph")]
    DanglingNode(NodeId),

    /// A cycle was reached while converting a graph into a tree-shaped Rust value
    #[error("Cycle through node {0} cannot be deserialized into an owned value")]
    Cycle(NodeId),

    /// Converting a graph into a Rust value read more nodes than allowed
    #[error("Visit limit exceeded: converting the graph reads more than {limit} nodes")]
    VisitLimit { limit: usize },

    /// Converting a graph into a Rust value nested deeper than allowed
    #[error("Depth limit exceeded: containers nest deeper than {limit} levels")]
    DepthLimit { limit: usize },

    /// Unsupported type for serialization
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a malformed-document error at the given location.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_taxi::Error;
    ///
    /// let err = Error::malformed(3, 5, "unterminated tag");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn malformed(line: usize, col: usize, msg: &str) -> Self {
        Error::Malformed {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an unrecognized-tag error.
    pub fn unrecognized_tag(line: usize, col: usize, tag: &str) -> Self {
        Error::UnrecognizedTag {
            line,
            col,
            tag: tag.to_string(),
        }
    }

    /// Creates an unsupported-version error. `None` means the attribute was absent.
    pub fn unsupported_version(found: Option<&str>) -> Self {
        Error::UnsupportedVersion {
            found: found.map(str::to_string),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(line: usize, col: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            expected: expected.to_string(),
        }
    }

    /// Creates an unsupported type error for values that cannot become graph nodes.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_taxi::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for every flavour of structurally invalid document.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. } | Error::UnexpectedEof { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
