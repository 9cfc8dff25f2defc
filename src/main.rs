use std::process::ExitCode;

use clap::Parser;
use i18nize::cli::{Arguments, ExitStatus};
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "I18NIZE_LOG";

/// `I18NIZE_LOG` wins; otherwise errors only, or everything down to debug with `-v`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose());

    match i18nize::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
