//! External process abstraction.
//!
//! Every process the bundler starts (control-plane queries, dependency
//! installs, front-end builds) goes through a [`CommandRunner`], so the
//! pipeline can be driven by a scripted runner in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::Result;

/// Specification for a process to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to execute, looked up on `PATH`.
    pub program: String,
    /// Arguments, passed without a shell.
    pub args: Vec<String>,
    /// Working directory; inherits the caller's when `None`.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: HashMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Outcome of a process whose output was streamed to the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for process runners.
///
/// Both methods block the caller until the process exits. They return an
/// error only when the process could not be started; a non-zero exit is
/// reported through the returned value.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Name of this runner.
    fn name(&self) -> &'static str;

    /// Run a process and capture its stdout and stderr.
    async fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run a process, passing its output through to the console.
    async fn stream(&self, spec: &CommandSpec) -> Result<RunOutcome>;
}
