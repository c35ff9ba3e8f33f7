//! Stage-labelled pipeline errors and their process exit codes.

use thiserror::Error;

use crate::print::PrintError;

/// A fatal pipeline failure. The display form starts with a short label naming
/// the stage, followed by the full cause chain.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("read token: {0:#}")]
    ReadToken(anyhow::Error),

    #[error("fetch: {0:#}")]
    Fetch(anyhow::Error),

    #[error("write output: {0:#}")]
    Output(anyhow::Error),

    #[error("print: {0}")]
    Print(#[from] PrintError),

    #[error("write token: {0:#}")]
    WriteToken(anyhow::Error),
}

impl PipelineError {
    /// Short stage label.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::ReadToken(_) => "read token",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Output(_) => "write output",
            PipelineError::Print(_) => "print",
            PipelineError::WriteToken(_) => "write token",
        }
    }

    /// Process exit code: the print command's own code when it exited with
    /// one, otherwise 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Print(e) => e.exit_code().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}
