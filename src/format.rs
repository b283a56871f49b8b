//! The Taxi document format.
//!
//! This module documents the Taxi text format as implemented by this library and
//! holds the [`FormatRegistry`] of versions the decoder accepts.
//!
//! # Overview
//!
//! Taxi is a tagged-text encoding of an object graph. Every node is one tag;
//! containers nest their children. Nodes that can be aliased carry a serial
//! `id`, and every visit after the first is written as a `redundant` stub that
//! points back at that id. Shared and cyclic structures therefore encode to a
//! finite document and decode to the same sharing.
//!
//! # Document
//!
//! ```text
//! <taxi ver="1.00">
//! 	<hashref id="0" class="Person">
//! 		<scalar name="name" value="Miko"/>
//! 		<arrayref name="schools" id="1">
//! 			<scalar value="Cardinal Forest"/>
//! 			<scalar value="Robinson"/>
//! 		</arrayref>
//! 		<arrayref name="alumni_of" id="1" redundant="1"/>
//! 	</hashref>
//! </taxi>
//! ```
//!
//! ## Grammar
//!
//! ```text
//! document   := "<taxi" WS "ver=\"" VERSION "\">" NEWLINE node* "</taxi>" NEWLINE
//! node       := mapping | sequence | box | scalar
//! mapping    := "<hashref" attrs ("/>" | ">" node* "</hashref>")
//! sequence   := "<arrayref" attrs ("/>" | ">" node* "</arrayref>")
//! box        := "<scalarref" attrs ("/>" | ">" node "</scalarref>")
//! scalar     := "<scalar" attrs "/>"
//! attrs      := (" name=\"" ESCAPED "\"")? (" id=\"" INT "\"")?
//!               (" class=\"" ESCAPED "\"")? (" redundant=\"1\"")?
//!               (" value=\"" ESCAPED "\"")?
//! ```
//!
//! | Tag | Node | Notes |
//! |-----|------|-------|
//! | `taxi` | document wrapper | Must be first; `ver` is checked against the registry |
//! | `hashref` | Mapping | Children carry `name` (their key) |
//! | `arrayref` | Sequence | Children are positional |
//! | `scalarref` | Box | Exactly one child |
//! | `scalar` | Scalar | `value` omitted when the scalar is absent |
//!
//! ## Attributes
//!
//! - `name`: the key of this node in its parent Mapping
//! - `id`: serial id, assigned 0, 1, 2, ... in first-visit order to every non-scalar node
//! - `class`: opaque type name, never interpreted by this crate
//! - `redundant="1"`: this tag is a stub for an id written earlier; it has no children
//! - `value`: scalar text
//!
//! Attribute values escape `&`, `"`, `<` and `>` as `&#38;`, `&#34;`, `&#60;`
//! and `&#62;` (see [`crate::escape`]).
//!
//! ## Whitespace
//!
//! Indentation and newlines between tags are cosmetic. The decoder accepts any
//! whitespace between tags, and an optional leading `<?...?>` declaration.

use crate::value::NodeKind;
use std::borrow::Cow;

/// The version string written by the encoder.
pub const FORMAT_VERSION: &str = "1.00";

pub(crate) const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>";

/// The five tag keywords of the format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TagKind {
    Document,
    Mapping,
    Sequence,
    Box,
    Scalar,
}

impl TagKind {
    pub(crate) const fn keyword(self) -> &'static str {
        match self {
            TagKind::Document => "taxi",
            TagKind::Mapping => "hashref",
            TagKind::Sequence => "arrayref",
            TagKind::Box => "scalarref",
            TagKind::Scalar => "scalar",
        }
    }

    pub(crate) fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "taxi" => Some(TagKind::Document),
            "hashref" => Some(TagKind::Mapping),
            "arrayref" => Some(TagKind::Sequence),
            "scalarref" => Some(TagKind::Box),
            "scalar" => Some(TagKind::Scalar),
            _ => None,
        }
    }

    /// The tag always follows the structural variant, never the class name.
    pub(crate) const fn of(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Sequence(_) => TagKind::Sequence,
            NodeKind::Mapping(_) => TagKind::Mapping,
            NodeKind::Box(_) => TagKind::Box,
        }
    }
}

/// The set of format versions a decoder accepts.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::{FormatRegistry, FORMAT_VERSION};
///
/// let registry = FormatRegistry::new();
/// assert!(registry.supports(FORMAT_VERSION));
/// assert!(!registry.supports("2.00"));
///
/// let registry = registry.with_version("0.90");
/// assert!(registry.supports("0.90"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatRegistry {
    versions: Vec<Cow<'static, str>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        FormatRegistry {
            versions: vec![Cow::Borrowed(FORMAT_VERSION)],
        }
    }
}

impl FormatRegistry {
    /// Creates a registry accepting only [`FORMAT_VERSION`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that accepts nothing.
    #[must_use]
    pub fn empty() -> Self {
        FormatRegistry {
            versions: Vec::new(),
        }
    }

    /// Adds an accepted version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        let version = version.into();
        if !self.supports(&version) {
            self.versions.push(version);
        }
        self
    }

    /// Returns `true` if documents declaring `version` can be decoded.
    #[must_use]
    pub fn supports(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// Iterates over the accepted versions.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_rejects_current() {
        assert!(!FormatRegistry::empty().supports(FORMAT_VERSION));
    }

    #[test]
    fn test_with_version_deduplicates() {
        let registry = FormatRegistry::new()
            .with_version(FORMAT_VERSION)
            .with_version(String::from("1.01"));
        assert_eq!(registry.versions().collect::<Vec<_>>(), vec!["1.00", "1.01"]);
    }
}
