use std::env;

use anyhow::{Context, Result};

use super::super::args::ValidateCommand;
use super::super::exit_status::ExitStatus;
use super::super::report;
use crate::{
    config::{ConfigError, load_config},
    core::validator::TextValidator,
};

/// Classify each text with the configured rules and print why.
pub fn validate(cmd: ValidateCommand) -> Result<ExitStatus> {
    let cwd = env::current_dir().context("Failed to read current directory")?;
    let config = load_config(&cwd)?.config;
    if let Err(ConfigError::Invalid(problems)) = config.validate() {
        report::print_config_errors(&problems);
        return Ok(ExitStatus::Error);
    }

    let (validator, warnings) = TextValidator::new(&config);
    for warning in &warnings {
        report::print_warning(warning);
    }

    let reports: Vec<_> = cmd
        .texts
        .iter()
        .map(|text| validator.detailed_report(text))
        .collect();
    report::print_validation(&reports);

    Ok(ExitStatus::Success)
}
