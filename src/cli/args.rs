//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `run`: Extract text, rewrite components and update catalogs
//! - `validate`: Explain how the rule engine classifies a piece of text
//! - `init`: Initialize i18nize configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::StrategyChoice;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Run(cmd)) => cmd.common.verbose,
            Some(Command::Validate(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct RunCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually rewrite files and catalogs (default is dry-run)
    #[arg(long)]
    pub apply: bool,

    /// Extraction strategy (overrides config file)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyChoice>,

    /// Source code root directory (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Catalog output directory (overrides config file)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Language of the text found in the sources (overrides config file)
    #[arg(long)]
    pub source_language: Option<String>,

    /// Language to create a catalog for (overrides config file)
    /// Can be specified multiple times: --target-language es --target-language fr
    #[arg(long)]
    pub target_language: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Text to classify
    #[arg(required = true)]
    pub texts: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replace hardcoded JSX text with translation calls and update catalogs
    Run(RunCommand),
    /// Show whether each text would be extracted, and why
    Validate(ValidateCommand),
    /// Initialize a new .i18nizerc.json configuration file
    Init,
}
