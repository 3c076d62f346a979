//! Process execution.
//!
//! [`Invocation`] is a fully-resolved command line: program, arguments,
//! extra environment, and where stdin/stdout go. [`SystemRunner`] spawns it
//! with `std::process::Command`; tests substitute a scripted runner.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Errors raised while running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", exit_status(.code))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Where a command's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutMode {
    /// Collect stdout and return it from [`CommandRunner::run`].
    Capture,
    /// Drop stdout; used for side-effect-only queries.
    Discard,
    /// Stream stdout into a file, truncating it first.
    File(PathBuf),
}

/// A single external command invocation.
#[derive(Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment.
    pub env: HashMap<String, String>,
    /// File fed to the command's stdin; stdin is closed when `None`.
    pub stdin: Option<PathBuf>,
    pub stdout: StdoutMode,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut env_keys: Vec<&String> = self.env.keys().collect();
        env_keys.sort();
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &env_keys)
            .field("stdin", &self.stdin)
            .field("stdout", &self.stdout)
            .finish()
    }
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: HashMap::new(),
            stdin: None,
            stdout: StdoutMode::Capture,
        }
    }

    /// Builder method: set the extra environment.
    pub fn with_env(self, env: HashMap<String, String>) -> Self {
        Self { env, ..self }
    }

    /// Builder method: set the stdout mode.
    pub fn with_stdout(self, stdout: StdoutMode) -> Self {
        Self { stdout, ..self }
    }

    /// Builder method: feed a file to stdin.
    pub fn with_stdin(self, path: PathBuf) -> Self {
        Self {
            stdin: Some(path),
            ..self
        }
    }
}

/// Runs external commands.
pub trait CommandRunner {
    /// Run `invocation` to completion.
    ///
    /// Returns the captured stdout for [`StdoutMode::Capture`] and an empty
    /// buffer otherwise. A non-zero exit status is an error.
    fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ExecError>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ExecError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .envs(&invocation.env)
            .stderr(Stdio::piped());

        match &invocation.stdin {
            Some(path) => {
                let file = File::open(path).map_err(|source| ExecError::Io {
                    path: path.clone(),
                    source,
                })?;
                cmd.stdin(file);
            }
            None => {
                cmd.stdin(Stdio::null());
            }
        }

        match &invocation.stdout {
            StdoutMode::Capture => {
                cmd.stdout(Stdio::piped());
            }
            StdoutMode::Discard => {
                cmd.stdout(Stdio::null());
            }
            StdoutMode::File(path) => {
                let file = File::create(path).map_err(|source| ExecError::Io {
                    path: path.clone(),
                    source,
                })?;
                cmd.stdout(file);
            }
        }

        debug!(program = %invocation.program, args = ?invocation.args, "running command");

        let output = cmd.output().map_err(|source| ExecError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ExecError::Exit {
                program: invocation.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
