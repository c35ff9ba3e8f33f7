//! CLI for autoprint.

use anyhow::{Context, Result};
use autoprint_core::config;
use autoprint_core::fetch::CurlFetcher;
use autoprint_core::logging;
use autoprint_core::pipeline::{Pipeline, RunOptions};
use autoprint_core::print::PrintCommand;
use autoprint_core::token_store::TokenStore;
use clap::Parser;
use std::path::PathBuf;

/// Fetch a document if it changed since the last run and send it to the printer.
#[derive(Debug, Parser)]
#[command(name = "autoprint", version)]
#[command(about = "Print a URL when its content changes (ETag-based)", long_about = None)]
pub struct Cli {
    /// HTTP/HTTPS URL of the document to print.
    pub url: String,

    /// Don't print anything; show the command that would run.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Ignore the stored ETag to force a download.
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/autoprint/config.toml).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            force: self.force,
        }
    }
}

/// Parses arguments and runs one pipeline. Returns the process exit code.
pub fn run_from_args() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return usage_exit_code(&err);
        }
    };

    if let Err(err) = logging::init_logging(cli.verbose) {
        eprintln!("autoprint: {:#}", err);
    }

    let pipeline = match build_pipeline(&cli) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("config: {:#}", err);
            return 1;
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match pipeline.run(&cli.url, &mut out) {
        Ok(outcome) => {
            tracing::debug!(?outcome, "done");
            0
        }
        Err(err) => {
            eprintln!("{}", err);
            err.exit_code()
        }
    }
}

/// Exit code for an argument parse result that stopped the run. `--help` and
/// `--version` are not failures; usage errors exit 1.
fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn build_pipeline(cli: &Cli) -> Result<Pipeline<CurlFetcher>> {
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    tracing::debug!("loaded config: {:?}", cfg);

    Ok(Pipeline::new(
        cli.options(),
        TokenStore::new(cfg.token_dir()),
        CurlFetcher::new(&cfg.http),
        PrintCommand::from_config(&cfg.print),
    ))
}

#[cfg(test)]
mod tests;
