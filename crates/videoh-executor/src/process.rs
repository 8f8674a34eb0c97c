//! Local process runner.

use async_trait::async_trait;
use chrono::Utc;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, info, warn};
use videoh_core::command::{CommandOutput, CommandRunner, CommandSpec, RunOutcome};
use videoh_core::{Error, Result};

/// Runs commands as child processes of the bundler.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).envs(&spec.env).stdin(Stdio::null());
        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run `spec`, copying the child's stdout and stderr into the given
    /// writers as raw bytes until both pipes close.
    async fn stream_to<O, E>(spec: &CommandSpec, out: O, err: E) -> Result<RunOutcome>
    where
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        info!(command = %spec, dir = ?spec.working_dir, "Starting command");
        let started_at = Utc::now();

        let mut child = Self::command(spec)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("child stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("child stderr not captured")))?;

        tokio::join!(
            pass_through(stdout, out, "stdout"),
            pass_through(stderr, err, "stderr"),
        );

        let status = child.wait().await?;
        let outcome = RunOutcome {
            exit_code: status.code(),
            started_at,
            finished_at: Utc::now(),
        };

        info!(command = %spec, exit_code = ?outcome.exit_code, "Command finished");
        Ok(outcome)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "Running command");

        let output = Self::command(spec)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        debug!(command = %spec, exit_code = ?result.exit_code, "Command finished");
        Ok(result)
    }

    async fn stream(&self, spec: &CommandSpec) -> Result<RunOutcome> {
        Self::stream_to(spec, tokio::io::stdout(), tokio::io::stderr()).await
    }
}

/// Forward bytes from a child pipe until it closes.
///
/// The pipe is drained even after the writer fails, so a child never blocks
/// on a full pipe.
async fn pass_through<R, W>(mut reader: R, mut writer: W, stream: &'static str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; 8192];
    let mut forward = true;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(stream, error = %e, "Error reading child output");
                break;
            }
        };
        if forward {
            if let Err(e) = writer.write_all(&buf[..n]).await {
                warn!(stream, error = %e, "Error forwarding child output");
                forward = false;
            }
        }
    }

    if forward {
        if let Err(e) = writer.flush().await {
            warn!(stream, error = %e, "Error flushing child output");
        }
    }
}
