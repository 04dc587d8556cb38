//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::ports::CommandRunner;

/// Default timeout for short host commands (`launchctl`, `ln`, `limactl list`).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for commands run inside the guest. Package installs are slow.
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for VM create/start/stop, which may download an image.
pub const LIFECYCLE_TIMEOUT: Duration = Duration::from_secs(900);

/// Production `CommandRunner` over `tokio::process`.
///
/// Both pipes are drained while waiting so a chatty child cannot block on a
/// full pipe. A child still running at the deadline is killed before the
/// timeout error is returned.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, "spawning");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = tokio::time::timeout(timeout, async {
            tokio::join!(child.wait(), drain(stdout), drain(stderr))
        })
        .await;

        match finished {
            Ok((status, stdout, stderr)) => Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            }),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(program, "failed to kill timed out process: {e}");
                }
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }
}

/// Read a child pipe to EOF. A read error ends the capture early.
async fn drain(pipe: Option<impl AsyncRead + Unpin>) -> Vec<u8> {
    let mut buf = Vec::new();
    let Some(mut pipe) = pipe else {
        return buf;
    };
    if let Err(e) = pipe.read_to_end(&mut buf).await {
        tracing::debug!("pipe read stopped: {e}");
    }
    buf
}

/// Turn a finished process into `Ok(())` or an error carrying its stderr.
///
/// # Errors
///
/// Returns an error if the process exited unsuccessfully.
pub fn ensure_success(program: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        anyhow::bail!("{program} failed ({})", output.status);
    }
    anyhow::bail!("{program} failed ({}): {stderr}", output.status)
}
