//! One transformation run over a sorted file list.
//!
//! Files are handled one at a time: extraction, descriptor inference, then
//! rewrite. A file that fails is recorded and skipped. The registry is the
//! only state shared between files and ends up in the catalog writer.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::core::catalog::{CatalogWriter, load_catalog};
use crate::core::descriptor::ComponentDescriptor;
use crate::core::registry::KeyRegistry;
use crate::core::strategy::{
    RewriteOutcome, SourceUnit, Strategy, TransformStrategy, select_strategy,
};
use crate::core::types::{FileError, TextExtraction, TransformResult, TransformStats};
use crate::core::validator::TextValidator;

pub struct Transformer<'a> {
    config: &'a Config,
    root: PathBuf,
}

impl<'a> Transformer<'a> {
    pub fn new(config: &'a Config, root: &Path) -> Self {
        Self {
            config,
            root: root.to_path_buf(),
        }
    }

    /// Run both passes over `files` and merge the catalogs.
    ///
    /// Nothing is written unless `apply` is set; the result then describes
    /// what would change.
    pub fn run(&self, files: &BTreeSet<String>, apply: bool) -> TransformResult {
        let mut stats = TransformStats::default();

        let (validator, pattern_warnings) = TextValidator::new(self.config);
        for warning in pattern_warnings {
            warn!("{}", warning);
            stats.warnings.push(warning);
        }

        let writer = CatalogWriter::new(self.config, &self.root);
        let previous = match load_catalog(writer.source_path()) {
            Ok(previous) => previous,
            Err(e) => {
                let warning = format!("{:#}; existing keys are not reused", e);
                warn!("{}", warning);
                stats.warnings.push(warning);
                None
            }
        };
        let mut registry = match &previous {
            Some(catalog) => KeyRegistry::seeded(self.config.key_strategy, catalog, &validator),
            None => KeyRegistry::new(self.config.key_strategy),
        };
        let seeded = registry.len();

        let source_root = Config::resolve_path(&self.root, &self.config.source_root);
        let strategy = select_strategy(self.config, &source_root, files);
        debug!(strategy = strategy.name(), files = files.len(), "starting run");

        let mut extractions = Vec::new();
        let mut modified_files = Vec::new();

        for file in files {
            let path = Path::new(file);
            let unit_path = self.display_path(path);
            let processed = self
                .process_file(&strategy, path, &unit_path, &validator, &mut registry)
                .and_then(|(found, outcome)| {
                    if apply && outcome.changed() {
                        fs::write(path, &outcome.content)
                            .with_context(|| format!("Failed to write file: {}", unit_path))?;
                    }
                    Ok((found, outcome))
                });

            match processed {
                Ok((found, outcome)) => {
                    debug!(
                        file = %unit_path,
                        fragments = found.len(),
                        replacements = outcome.replacements,
                        "processed"
                    );
                    stats.files_processed += 1;
                    stats.fragments_transformed += outcome.replacements;
                    stats.imports_added += usize::from(outcome.import_added);
                    stats.hooks_added += outcome.hooks_added;
                    stats.adapters_added += outcome.adapters_added;
                    if outcome.changed() {
                        modified_files.push(path.to_path_buf());
                    }
                    for warning in &outcome.warnings {
                        warn!("{}", warning);
                    }
                    stats.warnings.extend(outcome.warnings);
                    extractions.extend(found);
                }
                Err(e) => {
                    warn!(file = %unit_path, "skipped: {:#}", e);
                    stats.errors.push(FileError {
                        file_path: unit_path,
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        stats.duplicates = registry.duplicates();
        debug!(
            seeded,
            registered = registry.len(),
            rejections = ?validator.rejection_counts(),
            "extraction finished"
        );

        let catalogs = writer.build(&registry, previous.as_ref());
        for warning in &catalogs.warnings {
            warn!("{}", warning);
        }
        stats.warnings.extend(catalogs.warnings.iter().cloned());

        let mut catalog_files = Vec::new();
        let mut fatal_error = None;
        if apply {
            match writer.write(&catalogs) {
                Ok(written) => catalog_files = written,
                Err(e) => {
                    error!("{}", e);
                    fatal_error = Some(e.to_string());
                }
            }
        }

        TransformResult {
            success: fatal_error.is_none(),
            strategy: strategy.name(),
            stats,
            translations: catalogs.translations(),
            modified_files,
            catalog_files,
            extractions,
            fatal_error,
        }
    }

    fn process_file(
        &self,
        strategy: &Strategy,
        path: &Path,
        unit_path: &str,
        validator: &TextValidator,
        registry: &mut KeyRegistry,
    ) -> Result<(Vec<TextExtraction>, RewriteOutcome)> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", unit_path))?;
        let unit = SourceUnit::new(unit_path, content);

        let found = strategy.extract(&unit, validator, registry)?;
        let descriptor = ComponentDescriptor::infer(
            &unit.path,
            &unit.content,
            &self.config.attributes,
            &self.config.translation_module,
            validator,
        );
        let outcome = strategy.rewrite(&unit, &descriptor, validator, registry)?;
        Ok((found, outcome))
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}
