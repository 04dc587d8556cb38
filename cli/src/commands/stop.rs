//! `berth stop`: stop runtimes and the VM, preserving state.

use anyhow::Result;

use crate::app::AppContext;

/// Run `berth stop`.
///
/// # Errors
///
/// Returns an error if a dependency is missing or the VM fails to stop.
pub async fn run(app: &AppContext) -> Result<()> {
    let orchestrator = app.orchestrator(app.saved_vm_config()?)?;
    orchestrator.stop().await?;
    app.output.success("VM stopped");
    Ok(())
}
