//! Entity escaping for attribute text.
//!
//! Four characters are reserved inside attribute values: `&`, `"`, `<` and `>`.
//! They are written as the numeric entities `&#38;`, `&#34;`, `&#60;` and `&#62;`.
//! Both directions are a single left-to-right pass, so text that already looks
//! like an entity (`&#38;#34;`) survives a round trip unchanged.
//!
//! ```rust
//! use serde_taxi::escape::{escape, unescape};
//!
//! let raw = r#"<a href="x">&#34;</a>"#;
//! let escaped = escape(raw);
//! assert!(!escaped.contains('<'));
//! assert_eq!(unescape(&escaped), raw);
//! ```

use std::borrow::Cow;

const ENTITIES: [(char, &str); 4] = [('&', "&#38;"), ('"', "&#34;"), ('<', "&#60;"), ('>', "&#62;")];

#[inline]
fn entity_for(ch: char) -> Option<&'static str> {
    ENTITIES.iter().find(|(c, _)| *c == ch).map(|(_, e)| *e)
}

/// Replaces every reserved character with its numeric entity.
///
/// Returns the input unchanged (borrowed) when it holds no reserved characters.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '"', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match entity_for(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Inverse of [`escape`].
///
/// Only the four entities produced by `escape` are recognized. Any other `&`
/// sequence is kept literally.
#[must_use]
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(_, e)| rest.starts_with(e)) {
            Some((ch, entity)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
