//! Hand the downloaded file to the print command (`lp` by default).

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::config::PrintConfig;

#[derive(Debug, Error)]
pub enum PrintError {
    /// The command ran and exited non-zero.
    #[error("{program} exited with status {code}: {stderr}")]
    Exited {
        program: String,
        code: i32,
        stderr: String,
    },
    /// The command was killed before it could report an exit code.
    #[error("{program} terminated by signal: {stderr}")]
    Terminated { program: String, stderr: String },
    /// The command could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl PrintError {
    /// The command's own exit code, when it produced one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PrintError::Exited { code, .. } => Some(*code),
            PrintError::Terminated { .. } | PrintError::Spawn { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    /// The command ran and exited successfully.
    Printed,
    /// Dry run: `command` is what would have been run.
    DryRun { command: String },
}

/// Program plus leading arguments; the file path is always appended last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintCommand {
    program: String,
    args: Vec<String>,
}

impl PrintCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(cfg: &PrintConfig) -> Self {
        Self::new(cfg.program.clone(), cfg.args.clone())
    }

    /// Full argv for printing `path`.
    pub fn argv(&self, path: &Path) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv.push(path.display().to_string());
        argv
    }

    /// Human-readable command line for `path`.
    pub fn describe(&self, path: &Path) -> String {
        self.argv(path).join(" ")
    }

    /// Runs the command for `path`, or only describes it when `dry_run` is set.
    pub fn invoke(&self, path: &Path, dry_run: bool) -> Result<PrintOutcome, PrintError> {
        let command = self.describe(path);
        if dry_run {
            tracing::debug!("dry run, not running: {}", command);
            return Ok(PrintOutcome::DryRun { command });
        }

        tracing::debug!("running: {}", command);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| PrintError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(match output.status.code() {
                Some(code) => PrintError::Exited {
                    program: self.program.clone(),
                    code,
                    stderr,
                },
                None => PrintError::Terminated {
                    program: self.program.clone(),
                    stderr,
                },
            });
        }

        // Silent mode should print nothing; output means something is off.
        if !output.stdout.is_empty() {
            tracing::warn!(
                "{} printed unexpected output: {}",
                self.program,
                String::from_utf8_lossy(&output.stdout).trim()
            );
        }

        Ok(PrintOutcome::Printed)
    }
}

impl Default for PrintCommand {
    fn default() -> Self {
        Self::from_config(&PrintConfig::default())
    }
}
