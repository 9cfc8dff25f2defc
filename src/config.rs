use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".i18nizerc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/__tests__/**",
];

// BCP 47-ish: "en", "pt-BR", "zh_Hant", "es-419"
static LANGUAGE_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,3}(?:[-_][A-Za-z0-9]{2,8})*$").unwrap());

/// How catalog keys are derived from source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// The text itself is the key.
    #[default]
    Text,
    /// Short base-36 hash of the text.
    Hash,
    /// Slug of the whole text.
    Path,
    /// Slug of the first few words.
    Custom,
}

/// Which extraction/rewrite strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    #[default]
    Auto,
    Structural,
    Pattern,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_true")]
    pub ignore_test_files: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default)]
    pub target_languages: Vec<String>,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub key_strategy: KeyStrategy,
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub skip_patterns: Vec<String>,
    #[serde(default = "default_true")]
    pub inject_hooks: bool,
    #[serde(default = "default_true")]
    pub class_components: bool,
    #[serde(default)]
    pub generate_types: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types_file: Option<String>,
    #[serde(default = "default_true")]
    pub sort_keys: bool,
    #[serde(default = "default_indent")]
    pub indent: usize,
    #[serde(default = "default_translation_module")]
    pub translation_module: String,
    #[serde(default)]
    pub strategy: StrategyChoice,
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_includes() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_output_dir() -> String {
    "./locales".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_min_length() -> usize {
    2
}

fn default_max_length() -> usize {
    500
}

fn default_attributes() -> Vec<String> {
    ["placeholder", "title", "alt", "aria-label", "label"]
        .map(String::from)
        .to_vec()
}

fn default_indent() -> usize {
    2
}

fn default_translation_module() -> String {
    "react-i18next".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            includes: default_includes(),
            ignores: Vec::new(),
            ignore_test_files: true,
            output_dir: default_output_dir(),
            source_language: default_source_language(),
            target_languages: Vec::new(),
            min_length: default_min_length(),
            max_length: default_max_length(),
            key_strategy: KeyStrategy::default(),
            attributes: default_attributes(),
            skip_patterns: Vec::new(),
            inject_hooks: true,
            class_components: true,
            generate_types: false,
            types_file: None,
            sort_keys: true,
            indent: default_indent(),
            translation_module: default_translation_module(),
            strategy: StrategyChoice::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Collects every problem instead of stopping at the first one, so the
    /// user can fix the whole file in one pass.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.source_language.trim().is_empty() {
            problems.push("'sourceLanguage' is required".to_string());
        } else if !LANGUAGE_CODE_REGEX.is_match(&self.source_language) {
            problems.push(format!(
                "malformed language code in 'sourceLanguage': \"{}\"",
                self.source_language
            ));
        }

        for lang in &self.target_languages {
            if !LANGUAGE_CODE_REGEX.is_match(lang) {
                problems.push(format!(
                    "malformed language code in 'targetLanguages': \"{}\"",
                    lang
                ));
            } else if lang == &self.source_language {
                problems.push(format!(
                    "'targetLanguages' must not contain the source language \"{}\"",
                    lang
                ));
            }
        }

        if self.output_dir.trim().is_empty() {
            problems.push("'outputDir' is required".to_string());
        }

        if self.translation_module.trim().is_empty() {
            problems.push("'translationModule' is required".to_string());
        }

        if self.min_length > self.max_length {
            problems.push(format!(
                "'minLength' ({}) is greater than 'maxLength' ({})",
                self.min_length, self.max_length
            ));
        }

        for pattern in &self.ignores {
            if Pattern::new(pattern).is_err() {
                problems.push(format!("Invalid glob pattern in 'ignores': \"{}\"", pattern));
            }
        }

        // Patterns without wildcards are literal directory paths,
        // so `app/[locale]` is valid without escaping.
        for pattern in &self.includes {
            if (pattern.contains('*') || pattern.contains('?')) && Pattern::new(pattern).is_err()
            {
                problems.push(format!(
                    "Invalid glob pattern in 'includes': \"{}\"",
                    pattern
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Resolve `path` against `root` unless it is already absolute.
    pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p.strip_prefix(".").unwrap_or(p))
        }
    }

    pub fn source_catalog_path(&self, root: &Path) -> PathBuf {
        Self::resolve_path(root, &self.output_dir).join(format!("{}.json", self.source_language))
    }

    pub fn types_file_path(&self, root: &Path) -> PathBuf {
        match &self.types_file {
            Some(path) => Self::resolve_path(root, path),
            None => Self::resolve_path(root, &self.output_dir).join("keys.d.ts"),
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    /// Directory the config file lives in (or the start directory).
    pub root_dir: PathBuf,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            let root_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                from_file: true,
                root_dir,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
            root_dir: start_dir.to_path_buf(),
        }),
    }
}
