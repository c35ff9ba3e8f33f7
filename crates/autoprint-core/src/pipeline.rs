//! Fetch-and-print orchestration.
//!
//! One run is strictly sequential: read the stored ETag, fetch conditionally,
//! write the body to a temp file, print it, store the new ETag. The temp file
//! is released after the write succeeds, whatever happens afterwards.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::output::{self, OutputFile};
use crate::print::{PrintCommand, PrintOutcome};
use crate::token_store::TokenStore;

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Describe the print command instead of running it.
    pub dry_run: bool,
    /// Ignore the stored ETag and fetch unconditionally.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Server reported 304; nothing was written or printed.
    NotModified,
    /// The file at `path` (already removed) was printed.
    Printed { path: PathBuf },
    /// Dry run; `command` was not executed.
    DryRun { path: PathBuf, command: String },
}

pub struct Pipeline<F> {
    options: RunOptions,
    store: TokenStore,
    fetcher: F,
    printer: PrintCommand,
    output_parent: Option<PathBuf>,
}

impl<F: Fetcher> Pipeline<F> {
    pub fn new(options: RunOptions, store: TokenStore, fetcher: F, printer: PrintCommand) -> Self {
        Self {
            options,
            store,
            fetcher,
            printer,
            output_parent: None,
        }
    }

    /// Create per-run temp directories under `dir` instead of the platform temp dir.
    pub fn with_output_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_parent = Some(dir.into());
        self
    }

    /// Runs the pipeline for `url`. User-facing progress lines go to `out`.
    pub fn run(&self, url: &str, out: &mut dyn Write) -> Result<RunOutcome, PipelineError> {
        let stored = self.store.read(url).map_err(PipelineError::ReadToken)?;
        tracing::debug!(
            file = %self.store.path_for(url).display(),
            etag = %stored,
            "previous etag"
        );

        let token = if self.options.force {
            tracing::debug!("ignoring previous etag");
            ""
        } else {
            stored.as_str()
        };

        let mut fetched = match self.fetcher.fetch(url, token).map_err(PipelineError::Fetch)? {
            FetchOutcome::Unchanged => {
                report(out, "Not modified.");
                return Ok(RunOutcome::NotModified);
            }
            FetchOutcome::Fetched(resource) => resource,
        };
        tracing::debug!(
            url,
            filename = %fetched.filename,
            etag = %fetched.token,
            "fetched"
        );

        let output = self
            .write_output(&mut *fetched.body, &fetched.filename)
            .map_err(PipelineError::Output)?;
        tracing::debug!("wrote to file: {}", output.path().display());

        let result = self.print_and_store(url, output.path(), &fetched.token, out);

        let path = output.path().to_path_buf();
        if let Err(e) = output.release() {
            tracing::warn!("failed to remove temp output {}: {}", path.display(), e);
        }

        result
    }

    fn write_output(
        &self,
        body: &mut dyn std::io::Read,
        filename: &str,
    ) -> anyhow::Result<OutputFile> {
        match &self.output_parent {
            Some(parent) => output::write_output_under(parent, body, filename),
            None => output::write_output(body, filename),
        }
    }

    fn print_and_store(
        &self,
        url: &str,
        path: &Path,
        token: &str,
        out: &mut dyn Write,
    ) -> Result<RunOutcome, PipelineError> {
        report(out, "Printing...");
        let outcome = self.printer.invoke(path, self.options.dry_run)?;
        if let PrintOutcome::DryRun { command } = &outcome {
            report(out, &format!("Would run: {}", command));
        }

        self.store
            .write(url, token)
            .map_err(PipelineError::WriteToken)?;
        tracing::debug!(
            file = %self.store.path_for(url).display(),
            etag = %token,
            "wrote etag"
        );

        Ok(match outcome {
            PrintOutcome::Printed => RunOutcome::Printed {
                path: path.to_path_buf(),
            },
            PrintOutcome::DryRun { command } => RunOutcome::DryRun {
                path: path.to_path_buf(),
                command,
            },
        })
    }
}

fn report(out: &mut dyn Write, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        tracing::warn!("failed to write progress line: {}", e);
    }
}
