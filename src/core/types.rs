use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde::Serialize;

/// Where a fragment was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentKind {
    /// Text between an opening and a closing tag.
    ElementText,
    /// `placeholder`-like attribute value.
    PlaceholderAttribute,
    /// `title`/`alt`/`aria-label`-like attribute value.
    LabelAttribute,
}

impl FragmentKind {
    pub fn for_attribute(name: &str) -> Self {
        if name.contains("placeholder") {
            FragmentKind::PlaceholderAttribute
        } else {
            FragmentKind::LabelAttribute
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::ElementText => write!(f, "text"),
            FragmentKind::PlaceholderAttribute => write!(f, "placeholder"),
            FragmentKind::LabelAttribute => write!(f, "attribute"),
        }
    }
}

/// A candidate text run located in a source file.
///
/// `start..end` is the byte range to replace: the trimmed text for element
/// content, the quoted literal (quotes included) for attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub kind: FragmentKind,
    pub start: usize,
    pub end: usize,
}

/// An accepted fragment, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextExtraction {
    pub text: String,
    pub key: String,
    pub kind: FragmentKind,
    pub file_path: String,
    pub line: usize,
    pub col: usize,
    /// The full line the fragment starts on, for report context.
    pub source_line: String,
}

/// A file that could not be transformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file_path: String,
    pub message: String,
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformStats {
    pub files_processed: usize,
    pub fragments_transformed: usize,
    pub imports_added: usize,
    pub hooks_added: usize,
    pub adapters_added: usize,
    pub duplicates: usize,
    pub errors: Vec<FileError>,
    pub warnings: Vec<String>,
}

/// What one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct TransformResult {
    pub success: bool,
    pub strategy: &'static str,
    pub stats: TransformStats,
    /// Final key → text map of the source catalog.
    pub translations: BTreeMap<String, String>,
    pub modified_files: Vec<PathBuf>,
    /// Catalogs and type manifest actually written; empty on a dry run.
    pub catalog_files: Vec<PathBuf>,
    pub extractions: Vec<TextExtraction>,
    /// Set when the run aborted.
    pub fatal_error: Option<String>,
}
