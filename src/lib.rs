//! i18nize - move hard-coded JSX/TSX text into translation catalogs
//!
//! i18nize finds user-visible text in React components, replaces it with
//! translation calls, injects the binding each component needs and writes
//! flat per-language JSON catalogs.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and validation
//! - `core`: Extraction and rewrite engine
//! - `scanner`: Source file discovery
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod scanner;
pub mod utils;
