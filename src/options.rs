//! Configuration options for Taxi encoding.
//!
//! Layout never changes meaning: the decoder ignores whitespace between tags,
//! so every option here only affects how the document reads.
//!
//! ## Examples
//!
//! ```rust
//! use serde_taxi::{to_string_with_options, TaxiOptions};
//!
//! // Everything on one line
//! let taxi = to_string_with_options(&vec!["a", "b"], TaxiOptions::compact()).unwrap();
//! assert!(!taxi.contains('\n'));
//!
//! // Two spaces per level instead of a tab, with an XML declaration
//! let options = TaxiOptions::new().with_indent("  ").with_declaration(true);
//! let taxi = to_string_with_options(&vec!["a", "b"], options).unwrap();
//! assert!(taxi.starts_with("<?xml"));
//! ```

/// Configuration options for Taxi encoding.
///
/// # Examples
///
/// ```rust
/// use serde_taxi::TaxiOptions;
///
/// let options = TaxiOptions::new();
/// assert_eq!(options.indent, "\t");
/// assert!(options.pretty);
/// assert!(!options.declaration);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxiOptions {
    /// Written once per nesting level in front of each tag.
    pub indent: String,
    /// Put every tag on its own line.
    pub pretty: bool,
    /// Emit `<?xml version="1.0"?>` before the wrapper tag.
    pub declaration: bool,
}

impl Default for TaxiOptions {
    fn default() -> Self {
        TaxiOptions {
            indent: "\t".to_string(),
            pretty: true,
            declaration: false,
        }
    }
}

impl TaxiOptions {
    /// Creates default options (one tag per line, tab indentation, no declaration).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for single-line output without indentation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_taxi::TaxiOptions;
    ///
    /// let options = TaxiOptions::compact();
    /// assert!(!options.pretty);
    /// ```
    #[must_use]
    pub fn compact() -> Self {
        TaxiOptions {
            pretty: false,
            ..Default::default()
        }
    }

    /// Sets the indentation unit. Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Enables or disables the leading XML declaration.
    #[must_use]
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}
