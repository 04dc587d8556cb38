//! `berth delete`: remove runtime artifacts and the VM.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::commands::DeleteArgs;

/// Run `berth delete [-y]`.
///
/// Requested settings are kept so the next `berth start` recreates the VM
/// with the same resources.
///
/// # Errors
///
/// Returns an error if the prompt fails, a dependency is missing, or the VM
/// cannot be removed.
pub async fn run(args: &DeleteArgs, app: &AppContext) -> Result<()> {
    app.output.banner(&[
        "This will permanently remove the VM and everything inside it.".to_string(),
        format!("Settings in {} are preserved.", app.app_dir.display()),
    ]);

    if !args.yes && !app.confirm("Continue?", false)? {
        app.output.info("Cancelled.");
        return Ok(());
    }

    let orchestrator = app.orchestrator(app.saved_vm_config()?)?;
    orchestrator.delete().await?;
    config_service::clear_applied(&app.config_store)?;
    app.output.success("VM removed");
    Ok(())
}
