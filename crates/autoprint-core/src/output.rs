//! Temporary output file for one pipeline run.
//!
//! Every run gets its own `autoprint-XXXXXX` directory under the platform temp
//! dir. The returned [`OutputFile`] owns that directory: [`OutputFile::release`]
//! removes it, and dropping the handle without releasing removes it too.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::filename;

const TEMP_DIR_PREFIX: &str = "autoprint-";

/// A written output file and the directory that contains it.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    dir: TempDir,
}

impl OutputFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursively removes the temporary directory. Consumes the handle so it
    /// runs at most once.
    pub fn release(self) -> io::Result<()> {
        let dir = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!("removed temp dir {}", dir.display());
        Ok(())
    }
}

/// Copies `body` into `<new temp dir>/<filename>`.
///
/// `filename` is the server-suggested name; it is sanitized and falls back to
/// [`filename::UNKNOWN_FILENAME`] when empty. If the copy fails the directory is
/// removed before the error is returned.
pub fn write_output(body: &mut dyn Read, filename: &str) -> Result<OutputFile> {
    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()
        .context("create temp dir")?;
    write_output_in(dir, body, filename)
}

/// Like [`write_output`] but creates the temp dir under `parent`.
pub fn write_output_under(parent: &Path, body: &mut dyn Read, filename: &str) -> Result<OutputFile> {
    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir_in(parent)
        .with_context(|| format!("create temp dir under {}", parent.display()))?;
    write_output_in(dir, body, filename)
}

fn write_output_in(dir: TempDir, body: &mut dyn Read, filename: &str) -> Result<OutputFile> {
    let path = dir.path().join(filename::safe_output_name(filename));

    if let Err(e) = copy_to(&path, body) {
        if let Err(cleanup) = dir.close() {
            tracing::warn!("failed to remove temp dir after write error: {}", cleanup);
        }
        return Err(e);
    }

    Ok(OutputFile { path, dir })
}

fn copy_to(path: &Path, body: &mut dyn Read) -> Result<u64> {
    let file =
        File::create(path).with_context(|| format!("create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let n = io::copy(body, &mut writer)
        .with_context(|| format!("write output file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush output file: {}", path.display()))?;
    tracing::debug!("wrote {} bytes to {}", n, path.display());
    Ok(n)
}
