//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the output settings and the settings store and wires the
//! concrete host, VM and runtime adapters into an `Orchestrator`.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;

use crate::application::ports::{
    ConfigStore, ContainerRuntime, GuestVm, HostActions, ProgressReporter,
};
use crate::application::services::lifecycle::Orchestrator;
use crate::domain::VmConfig;
use crate::infra::config::YamlConfigStore;
use crate::infra::docker::{DockerRuntime, DockerSettings};
use crate::infra::host::{LocalHost, WhichLookup};
use crate::infra::lima::LimaVm;
use crate::infra::paths::{self, APP_NAME};
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `BERTH_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Persisted user settings.
    pub config_store: YamlConfigStore,
    /// Per-application directory holding settings, the socket and its script.
    pub app_dir: PathBuf,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `BERTH_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the application directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("BERTH_YES").is_ok();
        let app_dir = paths::app_dir()?;

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config_store: YamlConfigStore::new(&app_dir),
            app_dir,
            non_interactive: flags.behaviour.yes || ci_env,
        })
    }

    /// Progress reporter shared by the runtime adapters.
    #[must_use]
    pub fn reporter(&self) -> Rc<dyn ProgressReporter> {
        Rc::new(TerminalReporter::new(&self.output))
    }

    /// Host end of the forwarded docker socket.
    #[must_use]
    pub fn docker_socket(&self) -> PathBuf {
        self.app_dir.join("docker.sock")
    }

    /// VM configuration matching the saved settings exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read.
    pub fn saved_vm_config(&self) -> Result<VmConfig> {
        let saved = self.config_store.load()?;
        Ok(VmConfig::from_settings(&saved.vm, &saved.vm))
    }

    /// Assemble the Lima VM and the docker runtime into an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if a required host command is missing.
    pub fn orchestrator(&self, vm_config: VmConfig) -> Result<Orchestrator> {
        let host: Rc<dyn HostActions> = Rc::new(LocalHost::default_runner());
        let vm: Rc<dyn GuestVm> = Rc::new(LimaVm::default_runner(Rc::clone(&host), vm_config));
        let docker = DockerRuntime::new(
            DockerSettings {
                app_name: APP_NAME.to_string(),
                app_dir: self.app_dir.clone(),
                launch_agents_dir: paths::launch_agents_dir()?,
                ssh_port: vm_config.ssh_port,
            },
            Rc::clone(&vm),
            self.reporter(),
        );
        let containers: Vec<Box<dyn ContainerRuntime>> = vec![Box::new(docker)];

        Ok(Orchestrator::new(vm, containers, &WhichLookup)?)
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `BERTH_YES` env),
    /// returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
