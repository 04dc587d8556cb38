//! `berth start`: start the VM, provisioning it and its runtimes if needed.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::config_service::{self, VmOverrides};

/// Arguments for the start command.
#[derive(Args, Default)]
pub struct StartArgs {
    /// Number of vCPUs (saved for later runs)
    #[arg(long)]
    pub cpu: Option<u32>,
    /// Memory in GiB (saved for later runs)
    #[arg(long)]
    pub memory: Option<u32>,
    /// Disk size in GiB (saved for later runs)
    #[arg(long)]
    pub disk: Option<u32>,
}

impl From<&StartArgs> for VmOverrides {
    fn from(args: &StartArgs) -> Self {
        Self {
            cpu: args.cpu,
            memory: args.memory,
            disk: args.disk,
        }
    }
}

/// Run `berth start`.
///
/// Requested resources are saved only after the VM came up with them.
///
/// # Errors
///
/// Returns an error if a dependency is missing or any lifecycle phase fails.
pub async fn run(args: &StartArgs, app: &AppContext) -> Result<()> {
    let (vm_config, settings) = config_service::resolve_vm_config(&app.config_store, args.into())?;
    let orchestrator = app.orchestrator(vm_config)?;

    orchestrator.start().await?;
    config_service::save_config(&app.config_store, &settings)?;

    let runtimes = orchestrator.runtime_names().collect::<Vec<_>>().join(", ");
    app.output.success(&format!("VM running with {runtimes}"));
    app.output.vm_resources(&vm_config);
    app.output.kv(
        "DOCKER_HOST",
        &format!("unix://{}", app.docker_socket().display()),
    );
    Ok(())
}
