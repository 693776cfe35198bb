//! External runner: launches the data manager's invocation scripts.
//!
//! Commands are spawned directly from an argument vector; nothing goes
//! through a shell. Output is captured and replayed into the log: stdout
//! lines at info, stderr lines at warn. The warn level is a verbosity choice
//! only, since plenty of console tools print progress on stderr.

use quantconvert_core::PipelineError;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info, warn};

/// Program plus arguments, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Anything that can execute a [`CommandLine`] and report whether it worked.
///
/// Implementations never panic or return errors: every failure mode resolves
/// to `false`.
pub trait CommandRunner {
    fn run(&self, command: &CommandLine) -> bool;
}

/// Runs commands as real child processes and waits for them.
///
/// There is no timeout: a hung child blocks the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run the command, logging its output, and report launch failures and
    /// non-zero exits as errors.
    pub fn try_run(&self, command: &CommandLine) -> Result<(), PipelineError> {
        let program = command.program().display().to_string();
        debug!("> Commands = '{command}'");

        let output = Command::new(command.program())
            .args(command.args())
            .output()
            .map_err(|source| PipelineError::Launch {
                program: program.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!("> {line}");
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("> {line}");
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(PipelineError::ExitCode {
                program,
                code: output.status.code(),
            })
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandLine) -> bool {
        info!("calling Quant Data Manager:");
        match self.try_run(command) {
            Ok(()) => true,
            Err(e @ PipelineError::ExitCode { .. }) => {
                warn!("Returncode = {}", exit_code_label(&e));
                false
            }
            Err(e) => {
                error!(kind = e.kind(), "{e}");
                if let Some(source) = std::error::Error::source(&e) {
                    error!("caused by: {source:?}");
                }
                false
            }
        }
    }
}

fn exit_code_label(err: &PipelineError) -> String {
    match err {
        PipelineError::ExitCode { code: Some(c), .. } => c.to_string(),
        PipelineError::ExitCode { code: None, .. } => "none (terminated by signal)".to_string(),
        other => other.to_string(),
    }
}
