use std::{env, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::debug;

use super::super::args::RunCommand;
use super::super::exit_status::ExitStatus;
use super::super::report;
use crate::{
    config::{CONFIG_FILE_NAME, Config, ConfigError, load_config},
    core::Transformer,
    scanner::scan_files,
};

pub fn run(cmd: RunCommand) -> Result<ExitStatus> {
    let cwd = env::current_dir().context("Failed to read current directory")?;
    let loaded = load_config(&cwd)?;
    if !loaded.from_file {
        debug!("No {} found, using default configuration", CONFIG_FILE_NAME);
    }

    let root = loaded.root_dir;
    let mut config = loaded.config;
    apply_overrides(&mut config, &cmd, &cwd);

    let source_root = Config::resolve_path(&root, &config.source_root);
    if let Err(ConfigError::Invalid(problems)) = check_config(&config, &source_root) {
        report::print_config_errors(&problems);
        return Ok(ExitStatus::Error);
    }

    let scan = scan_files(
        &source_root,
        &config.includes,
        &config.ignores,
        config.ignore_test_files,
    );
    if scan.skipped_count > 0 {
        eprintln!(
            "{} {} path(s) skipped due to access errors",
            "warning:".bold().yellow(),
            scan.skipped_count
        );
    }

    let result = Transformer::new(&config, &root).run(&scan.files, cmd.apply);
    report::print_run(&result, &root, cmd.apply, cmd.common.verbose);

    if let Some(fatal) = &result.fatal_error {
        eprintln!("{} {}", "error:".bold().red(), fatal);
        return Ok(ExitStatus::Error);
    }
    Ok(ExitStatus::Success)
}

/// CLI > config file > defaults. Paths given on the command line are
/// relative to the working directory, not to the config file.
fn apply_overrides(config: &mut Config, cmd: &RunCommand, cwd: &Path) {
    if let Some(strategy) = cmd.strategy {
        config.strategy = strategy;
    }
    if let Some(source_root) = &cmd.source_root {
        config.source_root = cwd.join(source_root).to_string_lossy().into_owned();
    }
    if let Some(output_dir) = &cmd.output_dir {
        config.output_dir = cwd.join(output_dir).to_string_lossy().into_owned();
    }
    if let Some(source_language) = &cmd.source_language {
        config.source_language = source_language.clone();
    }
    if !cmd.target_language.is_empty() {
        config.target_languages = cmd.target_language.clone();
    }
}

/// Every config problem at once, including a missing source directory.
fn check_config(config: &Config, source_root: &Path) -> std::result::Result<(), ConfigError> {
    let mut problems = match config.validate() {
        Ok(()) => Vec::new(),
        Err(ConfigError::Invalid(problems)) => problems,
    };
    if !source_root.is_dir() {
        problems.push(format!(
            "source directory does not exist: {}",
            source_root.display()
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(problems))
    }
}
