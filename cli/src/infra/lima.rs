//! Guest VM backed by a Lima instance.
//!
//! All `limactl` calls go through a `CommandRunner`, so tests inject a
//! recording runner instead of spawning processes.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::application::ports::{CommandRunner, Dependencies, GuestActions, GuestVm, HostActions};
use crate::domain::VmConfig;
use crate::infra::command_runner::{
    DEFAULT_CMD_TIMEOUT, DEFAULT_EXEC_TIMEOUT, LIFECYCLE_TIMEOUT, TokioCommandRunner,
    ensure_success,
};

/// The Lima instance name all commands target.
pub const LIMA_INSTANCE: &str = "berth";

const LIMACTL: &str = "limactl";

/// Instance state as reported by `limactl list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstanceState {
    Missing,
    Running,
    /// Stopped, broken, or any other non-running status.
    Stopped,
}

impl InstanceState {
    /// Find the instance in `limactl list --format "{{.Name}} {{.Status}}"` output.
    fn parse(list: &str) -> Self {
        list.lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                Some((fields.next()?, fields.next().unwrap_or_default()))
            })
            .find(|(name, _)| *name == LIMA_INSTANCE)
            .map_or(Self::Missing, |(_, status)| {
                if status == "Running" {
                    Self::Running
                } else {
                    Self::Stopped
                }
            })
    }
}

pub struct LimaVm<R: CommandRunner> {
    runner: R,
    host: Rc<dyn HostActions>,
    config: VmConfig,
    /// Whether `config` still has to be written to the instance.
    resources_pending: Cell<bool>,
}

impl<R: CommandRunner> LimaVm<R> {
    pub fn new(runner: R, host: Rc<dyn HostActions>, config: VmConfig) -> Self {
        Self {
            runner,
            host,
            resources_pending: Cell::new(config.changed),
            config,
        }
    }

    async fn limactl(&self, args: &[&str], timeout: Duration) -> Result<()> {
        let output = self
            .runner
            .run_with_timeout(LIMACTL, args, timeout)
            .await
            .with_context(|| format!("limactl {}", args.first().copied().unwrap_or_default()))?;
        ensure_success(LIMACTL, &output)
    }

    async fn state(&self) -> Result<InstanceState> {
        let output = self
            .runner
            .run_with_timeout(
                LIMACTL,
                &["list", "--format", "{{.Name}} {{.Status}}"],
                DEFAULT_CMD_TIMEOUT,
            )
            .await
            .context("limactl list")?;
        ensure_success(LIMACTL, &output)?;
        Ok(InstanceState::parse(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn limactl_stop(&self) -> Result<()> {
        tracing::info!(instance = LIMA_INSTANCE, "stopping vm");
        self.limactl(&["stop", LIMA_INSTANCE], LIFECYCLE_TIMEOUT).await
    }

    fn resource_flags(&self) -> Vec<String> {
        vec![
            format!("--cpus={}", self.config.cpu),
            format!("--memory={}", self.config.memory),
            format!("--disk={}", self.config.disk),
        ]
    }

    fn create_args(&self) -> Vec<String> {
        let mut args = vec!["create".to_string(), format!("--name={LIMA_INSTANCE}")];
        args.extend(self.resource_flags());
        args.push("--set".to_string());
        args.push(format!(".ssh.localPort = {}", self.config.ssh_port));
        args.push("--tty=false".to_string());
        args.push("template://default".to_string());
        args
    }

    fn edit_args(&self) -> Vec<String> {
        let mut args = vec!["edit".to_string(), LIMA_INSTANCE.to_string()];
        args.extend(self.resource_flags());
        args.push("--tty=false".to_string());
        args
    }
}

impl LimaVm<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(host: Rc<dyn HostActions>, config: VmConfig) -> Self {
        Self::new(TokioCommandRunner::default(), host, config)
    }
}

impl<R: CommandRunner> Dependencies for LimaVm<R> {
    fn dependencies(&self) -> &[&str] {
        &[LIMACTL]
    }
}

#[async_trait(?Send)]
impl<R: CommandRunner> GuestActions for LimaVm<R> {
    async fn run(&self, args: &[&str]) -> Result<()> {
        let mut full = vec!["shell", LIMA_INSTANCE, "--"];
        full.extend_from_slice(args);
        self.limactl(&full, DEFAULT_EXEC_TIMEOUT).await
    }
}

#[async_trait(?Send)]
impl<R: CommandRunner> GuestVm for LimaVm<R> {
    async fn start(&self) -> Result<()> {
        let mut state = self.state().await?;
        if state == InstanceState::Missing {
            tracing::info!(instance = LIMA_INSTANCE, cpu = self.config.cpu, "creating vm");
            let args = self.create_args();
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            self.limactl(&args, LIFECYCLE_TIMEOUT).await?;
            self.resources_pending.set(false);
            state = InstanceState::Stopped;
        } else if self.resources_pending.get() {
            if state == InstanceState::Running {
                self.limactl_stop().await?;
                state = InstanceState::Stopped;
            }
            tracing::info!(instance = LIMA_INSTANCE, "applying new vm resources");
            let args = self.edit_args();
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            self.limactl(&args, LIFECYCLE_TIMEOUT).await?;
            self.resources_pending.set(false);
        }

        if state == InstanceState::Running {
            tracing::info!(instance = LIMA_INSTANCE, "vm already running");
            return Ok(());
        }
        tracing::info!(instance = LIMA_INSTANCE, "starting vm");
        self.limactl(&["start", "--tty=false", LIMA_INSTANCE], LIFECYCLE_TIMEOUT)
            .await
    }

    async fn stop(&self) -> Result<()> {
        match self.state().await? {
            InstanceState::Running => self.limactl_stop().await,
            state => {
                tracing::info!(instance = LIMA_INSTANCE, ?state, "vm already stopped");
                Ok(())
            }
        }
    }

    async fn teardown(&self) -> Result<()> {
        if self.state().await? == InstanceState::Missing {
            tracing::info!(instance = LIMA_INSTANCE, "no vm to delete");
            return Ok(());
        }
        tracing::info!(instance = LIMA_INSTANCE, "deleting vm");
        self.limactl(&["delete", "--force", LIMA_INSTANCE], LIFECYCLE_TIMEOUT)
            .await
    }

    fn host(&self) -> Rc<dyn HostActions> {
        Rc::clone(&self.host)
    }
}
