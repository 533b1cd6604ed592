//! External tool invocation.
//!
//! Every tool call is an explicit program and argument vector run without a
//! shell. The call blocks until the tool exits; there is no timeout.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::BuildError;

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<OsString>,
    /// Working directory the tool runs in
    pub cwd: PathBuf,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured output of a successful tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Log the captured streams of a successful run at debug level
    pub fn log(&self, program: &str) {
        for (stream, text) in [("stdout", &self.stdout), ("stderr", &self.stderr)] {
            let text = text.trim_end();
            if !text.is_empty() {
                tracing::debug!("{program} {stream}: {text}");
            }
        }
    }
}

/// Runs tool commands. A non-zero exit is reported as `BuildError::ToolFailed`.
pub trait CommandRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, BuildError>;
}

/// Runs commands as child processes of this one
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput, BuildError> {
        tracing::debug!("running `{command}` in {}", command.cwd.display());

        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .output()
            .map_err(|source| BuildError::ToolSpawn {
                program: command.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(ToolOutput { stdout, stderr })
        } else {
            Err(BuildError::ToolFailed {
                program: command.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr,
            })
        }
    }
}
