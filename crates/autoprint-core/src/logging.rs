//! Logging init: diagnostics to stderr in verbose mode, nothing otherwise.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,autoprint=debug,autoprint_core=debug";

/// Install the global subscriber.
///
/// With `verbose` unset no subscriber is installed, so every `tracing` event is
/// discarded. With `verbose` set, events go to stderr without ANSI colors;
/// `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) -> Result<()> {
    if !verbose {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init logging: {}", e))?;

    tracing::debug!("verbose logging enabled");

    Ok(())
}
