//! Transformation strategies.
//!
//! - `structural`: swc AST of each file; fragment and scope boundaries are
//!   exact.
//! - `pattern`: regex scan of the raw text; works on anything that looks
//!   like markup, at the cost of heuristics.
//!
//! Both feed the same edit planner in [`scope`], so their output only differs
//! where their view of the file differs.

use std::path::Path;

use anyhow::Result;
use enum_dispatch::enum_dispatch;

use crate::config::{Config, StrategyChoice};
use crate::core::descriptor::ComponentDescriptor;
use crate::core::registry::KeyRegistry;
use crate::core::types::{Fragment, TextExtraction};
use crate::core::validator::TextValidator;
use crate::utils::LineIndex;

pub mod pattern;
pub mod scope;
pub mod structural;

pub use pattern::PatternStrategy;
pub use structural::StructuralStrategy;

/// Project markers that indicate a JS/TS toolchain, hence parseable sources.
const PROJECT_MARKERS: &[&str] = &["package.json", "tsconfig.json", "jsconfig.json"];

const PARSEABLE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// One source file as read from disk.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: String,
    pub content: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Settings the rewrite needs from the config.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub attributes: Vec<String>,
    pub inject_hooks: bool,
    pub class_components: bool,
    pub translation_module: String,
}

impl From<&Config> for RewriteOptions {
    fn from(config: &Config) -> Self {
        Self {
            attributes: config.attributes.clone(),
            inject_hooks: config.inject_hooks,
            class_components: config.class_components,
            translation_module: config.translation_module.clone(),
        }
    }
}

/// Result of rewriting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub content: String,
    pub replacements: usize,
    pub import_added: bool,
    pub hooks_added: usize,
    pub adapters_added: usize,
    pub warnings: Vec<String>,
}

impl RewriteOutcome {
    pub fn unchanged(source: &str) -> Self {
        Self {
            content: source.to_string(),
            replacements: 0,
            import_added: false,
            hooks_added: 0,
            adapters_added: 0,
            warnings: Vec::new(),
        }
    }

    /// Whether the file must be written back.
    pub fn changed(&self) -> bool {
        self.replacements > 0 || self.import_added || self.hooks_added > 0 || self.adapters_added > 0
    }
}

#[enum_dispatch]
pub trait TransformStrategy {
    fn name(&self) -> &'static str;

    /// Candidate fragments of one file, in source order.
    fn fragments(&self, unit: &SourceUnit) -> Result<Vec<Fragment>>;

    /// Register every accepted fragment and report where it was found.
    fn extract(
        &self,
        unit: &SourceUnit,
        validator: &TextValidator,
        registry: &mut KeyRegistry,
    ) -> Result<Vec<TextExtraction>> {
        let fragments = self.fragments(unit)?;
        Ok(collect_extractions(unit, fragments, validator, registry))
    }

    /// Replace accepted fragments with translation calls and add whatever
    /// binding the touched components need.
    fn rewrite(
        &self,
        unit: &SourceUnit,
        descriptor: &ComponentDescriptor,
        validator: &TextValidator,
        registry: &mut KeyRegistry,
    ) -> Result<RewriteOutcome>;
}

#[enum_dispatch(TransformStrategy)]
#[derive(Debug)]
pub enum Strategy {
    Structural(StructuralStrategy),
    Pattern(PatternStrategy),
}

fn collect_extractions(
    unit: &SourceUnit,
    fragments: Vec<Fragment>,
    validator: &TextValidator,
    registry: &mut KeyRegistry,
) -> Vec<TextExtraction> {
    let lines = LineIndex::new(&unit.content);
    fragments
        .into_iter()
        .filter(|fragment| validator.classify(&fragment.text).is_accept())
        .map(|fragment| {
            let (line, col) = lines.position(&unit.content, fragment.start);
            let key = registry.resolve(&fragment.text);
            TextExtraction {
                text: fragment.text.trim().to_string(),
                key,
                kind: fragment.kind,
                file_path: unit.path.clone(),
                line,
                col,
                source_line: unit.content.lines().nth(line - 1).unwrap_or_default().to_string(),
            }
        })
        .collect()
}

/// Pick the strategy for a run.
///
/// `auto` goes structural when the source root carries a JS/TS project
/// marker and every discovered file has an extension swc parses, and falls
/// back to pattern matching otherwise.
pub fn select_strategy<'a>(
    config: &Config,
    source_root: &Path,
    files: impl IntoIterator<Item = &'a String>,
) -> Strategy {
    let options = RewriteOptions::from(config);
    let structural = match config.strategy {
        StrategyChoice::Structural => true,
        StrategyChoice::Pattern => false,
        StrategyChoice::Auto => {
            let has_marker = PROJECT_MARKERS
                .iter()
                .any(|marker| source_root.join(marker).is_file());
            has_marker
                && files.into_iter().all(|file| {
                    Path::new(file)
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| PARSEABLE_EXTENSIONS.contains(&ext))
                })
        }
    };

    if structural {
        Strategy::Structural(StructuralStrategy::new(options))
    } else {
        Strategy::Pattern(PatternStrategy::new(options))
    }
}
