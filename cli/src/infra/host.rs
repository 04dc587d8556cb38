//! Host-side execution and dependency lookup.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::application::ports::{CommandRunner, DependencyLookup, HostActions};
use crate::infra::command_runner::{TokioCommandRunner, ensure_success};

/// Runs commands directly on the host through a `CommandRunner`.
pub struct LocalHost<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> LocalHost<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl LocalHost<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::default())
    }
}

#[async_trait(?Send)]
impl<R: CommandRunner> HostActions for LocalHost<R> {
    async fn run(&self, args: &[&str]) -> Result<()> {
        let Some((program, rest)) = args.split_first() else {
            anyhow::bail!("empty host command");
        };
        let output = self
            .runner
            .run(program, rest)
            .await
            .with_context(|| format!("running {program} on host"))?;
        ensure_success(program, &output)
    }
}

/// Looks commands up on `PATH`.
pub struct WhichLookup;

impl DependencyLookup for WhichLookup {
    fn is_available(&self, command: &str) -> bool {
        which::which(command).is_ok()
    }
}
