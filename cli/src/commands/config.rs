//! `berth config`: show and set configuration values.

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key (vm.cpu, vm.memory, vm.disk)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the settings file
/// cannot be read or written.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Set { key, value } => set_config(app, &key, &value),
    }
}

fn show_config(app: &AppContext) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    let path = app.config_store.path()?;
    app.output.header(&format!("Configuration ({})", path.display()));
    app.output.kv("vm.cpu   ", &config.vm.cpu.to_string());
    app.output.kv("vm.memory", &format!("{} GiB", config.vm.memory));
    app.output.kv("vm.disk  ", &format!("{} GiB", config.vm.disk));
    Ok(())
}

fn set_config(app: &AppContext, key: &str, value: &str) -> Result<()> {
    config_service::set_value(&app.config_store, key, value)?;
    app.output.success(&format!("Set {key} = {value}"));
    app.output.warn("Takes effect on the next `berth start`");
    Ok(())
}
