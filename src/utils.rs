//! Common utility functions shared across the codebase.

use std::{borrow::Cow, sync::LazyLock};

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::Regex;

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap()
});

/// Checks if the text contains at least one Unicode alphabetic character.
///
/// Returns false for empty strings, pure numbers, or pure symbols.
///
/// # Examples
///
/// ```
/// use i18nize::utils::contains_alphabetic;
///
/// assert!(contains_alphabetic("Hello"));
/// assert!(contains_alphabetic("你好"));
/// assert!(contains_alphabetic("Ñandú"));
/// assert!(!contains_alphabetic("123"));
/// assert!(!contains_alphabetic("---"));
/// assert!(!contains_alphabetic(""));
/// ```
pub fn contains_alphabetic(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic())
}

/// Byte offsets of line starts, for O(log n) offset → line/column lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    offsets: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut offsets = vec![0]; // Line 1 starts at offset 0
        for (i, c) in content.char_indices() {
            if c == '\n' {
                offsets.push(i + 1);
            }
        }
        Self { offsets }
    }

    /// 1-based line and column (in characters) for a byte offset.
    pub fn position(&self, content: &str, offset: usize) -> (usize, usize) {
        let line = match self.offsets.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        };
        let line_start = self.offsets[line - 1];
        let col = content
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count())
            + 1;
        (line, col)
    }
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent(content: &str, offset: usize) -> &str {
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &content[line_start..];
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Decode HTML character references the way JSX text renders them.
///
/// Unknown or invalid references stay as written.
///
/// ```
/// use i18nize::utils::decode_entities;
///
/// assert_eq!(decode_entities("Terms &amp; conditions"), "Terms & conditions");
/// assert_eq!(decode_entities("&copy; 2024 &#8212; &#x41;"), "© 2024 — A");
/// assert_eq!(decode_entities("&bogus; fine"), "&bogus; fine");
/// ```
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY_REGEX.replace_all(text, |caps: &regex::Captures| {
        let reference = &caps[0];
        unescape_with(reference, resolve_html5_entity)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| reference.to_string())
    })
}
