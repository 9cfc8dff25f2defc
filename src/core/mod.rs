//! Extraction and rewrite engine.
//!
//! ## Module Structure
//!
//! - `validator`: decides whether a text fragment is UI copy
//! - `registry`: text ↔ key association, seeded from the source catalog
//! - `descriptor`: per-file component metadata
//! - `strategy`: structural (swc) and pattern (regex) fragment location
//! - `rewrite`: text edits shared by both strategies
//! - `catalog`: per-language JSON catalogs and the type manifest
//! - `pipeline`: runs everything over a file list

pub mod catalog;
pub mod descriptor;
pub mod pipeline;
pub mod registry;
pub mod rewrite;
pub mod strategy;
pub mod types;
pub mod validator;

pub use catalog::{CatalogWriter, FatalError};
pub use pipeline::Transformer;
pub use types::{FileError, Fragment, FragmentKind, TextExtraction, TransformResult, TransformStats};
