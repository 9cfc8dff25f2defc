//! Flat key → text catalogs, one JSON file per language.
//!
//! The source-language catalog holds every registered text. Target catalogs
//! are append-only: missing keys get `""`, existing values are never touched.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::core::registry::KeyRegistry;

/// Failures that abort a run.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a flat catalog. `Ok(None)` when the file does not exist.
pub fn load_catalog(path: &Path) -> Result<Option<Map<String, Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => bail!("Root of JSON file must be an object: {}", path.display()),
    }
}

/// One catalog as it will be written.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    pub language: String,
    pub path: PathBuf,
    pub entries: Map<String, Value>,
    /// Keys this run adds to the file.
    pub added: usize,
}

/// Every file a run produces.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    pub source: CatalogFile,
    pub targets: Vec<CatalogFile>,
    /// Type manifest path and content, when enabled.
    pub types: Option<(PathBuf, String)>,
    pub warnings: Vec<String>,
}

impl CatalogSet {
    /// Source catalog as key → text.
    pub fn translations(&self) -> BTreeMap<String, String> {
        self.source
            .entries
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
            .collect()
    }
}

pub struct CatalogWriter<'a> {
    config: &'a Config,
    output_dir: PathBuf,
    source_path: PathBuf,
    types_path: PathBuf,
}

impl<'a> CatalogWriter<'a> {
    pub fn new(config: &'a Config, root: &Path) -> Self {
        Self {
            config,
            output_dir: Config::resolve_path(root, &config.output_dir),
            source_path: config.source_catalog_path(root),
            types_path: config.types_file_path(root),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Merge the registry into the catalogs on disk, without writing.
    ///
    /// `previous` is the source catalog the registry was seeded from; its
    /// entries survive even when the registry did not pick them up.
    pub fn build(&self, registry: &KeyRegistry, previous: Option<&Map<String, Value>>) -> CatalogSet {
        let mut warnings = Vec::new();

        let mut entries = previous.cloned().unwrap_or_default();
        let mut added = 0;
        for (key, text) in registry.entries() {
            if entries.get(key).and_then(Value::as_str) != Some(text) {
                if !entries.contains_key(key) {
                    added += 1;
                }
                entries.insert(key.to_string(), Value::String(text.to_string()));
            }
        }
        let source = CatalogFile {
            language: self.config.source_language.clone(),
            path: self.source_path.clone(),
            entries: self.ordered(entries),
            added,
        };

        let targets = self
            .config
            .target_languages
            .iter()
            .map(|language| self.merge_target(language, &source.entries, &mut warnings))
            .collect();

        let types = self.config.generate_types.then(|| {
            let keys: Vec<&str> = source.entries.keys().map(String::as_str).collect();
            (self.types_path.clone(), render_type_manifest(&keys))
        });

        CatalogSet {
            source,
            targets,
            types,
            warnings,
        }
    }

    fn merge_target(
        &self,
        language: &str,
        source: &Map<String, Value>,
        warnings: &mut Vec<String>,
    ) -> CatalogFile {
        let path = self.output_dir.join(format!("{}.json", language));
        let mut entries = match load_catalog(&path) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warnings.push(format!("{:#}; treating it as empty", e));
                Map::new()
            }
        };

        let mut added = 0;
        for key in source.keys() {
            if !entries.contains_key(key) {
                entries.insert(key.clone(), Value::String(String::new()));
                added += 1;
            }
        }

        // Keys the source catalog no longer has: untranslated ones go,
        // translated ones stay until someone removes them by hand.
        let before = entries.len();
        entries.retain(|key, value| source.contains_key(key) || !is_untranslated(value));
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(
                catalog = %path.display(),
                dropped,
                "dropped untranslated keys missing from the source catalog"
            );
        }

        let orphans = entries.keys().filter(|key| !source.contains_key(*key)).count();
        if orphans > 0 {
            warnings.push(format!(
                "{} has {} translated key(s) not in the {} catalog; kept",
                path.display(),
                orphans,
                self.config.source_language
            ));
        }

        CatalogFile {
            language: language.to_string(),
            path,
            entries: self.ordered(entries),
            added,
        }
    }

    fn ordered(&self, entries: Map<String, Value>) -> Map<String, Value> {
        if !self.config.sort_keys {
            return entries;
        }
        let mut sorted: Vec<(String, Value)> = entries.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted.into_iter().collect()
    }

    /// Write every file of `set` whose content changed. Returns the paths
    /// written.
    pub fn write(&self, set: &CatalogSet) -> std::result::Result<Vec<PathBuf>, FatalError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| FatalError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::new();
        for file in std::iter::once(&set.source).chain(&set.targets) {
            let content = self.render(&file.path, &file.entries)?;
            if write_if_changed(&file.path, &content)? {
                written.push(file.path.clone());
            }
        }

        if let Some((path, content)) = &set.types {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| FatalError::OutputDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            if write_if_changed(path, content)? {
                written.push(path.clone());
            }
        }

        Ok(written)
    }

    /// Pretty JSON with the configured indentation and a trailing newline.
    pub fn render(
        &self,
        path: &Path,
        entries: &Map<String, Value>,
    ) -> std::result::Result<String, FatalError> {
        let indent = " ".repeat(self.config.indent);
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut out,
            PrettyFormatter::with_indent(indent.as_bytes()),
        );
        entries
            .serialize(&mut serializer)
            .map_err(|source| FatalError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;
        let mut content = String::from_utf8_lossy(&out).into_owned();
        content.push('\n');
        Ok(content)
    }
}

/// An empty placeholder, as written for keys nobody has translated yet.
fn is_untranslated(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

fn write_if_changed(path: &Path, content: &str) -> std::result::Result<bool, FatalError> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        return Ok(false);
    }
    fs::write(path, content).map_err(|source| FatalError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// `export type TranslationKey = | "a" | "b";`, one key per line.
pub fn render_type_manifest(keys: &[&str]) -> String {
    if keys.is_empty() {
        return "export type TranslationKey = never;\n".to_string();
    }
    let mut keys = keys.to_vec();
    keys.sort_unstable();
    let union: Vec<String> = keys
        .iter()
        .map(|key| format!("  | {}", Value::String(key.to_string())))
        .collect();
    format!("export type TranslationKey =\n{};\n", union.join("\n"))
}
