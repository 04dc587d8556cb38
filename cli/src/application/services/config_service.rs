//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::{BerthConfig, VmConfig, validate_config_key, validate_config_value};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the settings file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<BerthConfig> {
    store.load()
}

/// Save configuration.
///
/// # Errors
///
/// Returns an error if the settings file cannot be written.
pub fn save_config(store: &impl ConfigStore, config: &BerthConfig) -> Result<()> {
    store.save(config)
}

/// Validate and persist a single `key = value` setting.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or the store fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<BerthConfig> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;
    let mut config = store.load()?;
    config.vm.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}

/// Resources requested for one `start` invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct VmOverrides {
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
    pub disk: Option<u32>,
}

/// Resolve the VM configuration for this run.
///
/// The requested resources are the saved settings plus `overrides`. They are
/// flagged as changed when they differ from the resources the VM last started
/// with, or from the saved settings when no start was recorded yet.
///
/// Returns the VM configuration together with the settings to save once the
/// VM starts with them.
///
/// # Errors
///
/// Returns an error if the saved settings cannot be loaded or an override is invalid.
pub fn resolve_vm_config(
    store: &impl ConfigStore,
    overrides: VmOverrides,
) -> Result<(VmConfig, BerthConfig)> {
    let saved = store.load()?;
    let requested = saved
        .vm
        .with_overrides(overrides.cpu, overrides.memory, overrides.disk)?;
    let running_with = saved.applied.as_ref().unwrap_or(&saved.vm);
    let vm_config = VmConfig::from_settings(&requested, running_with);
    Ok((
        vm_config,
        BerthConfig {
            applied: Some(requested.clone()),
            vm: requested,
        },
    ))
}

/// Drop the record of applied resources once the VM is gone.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read or written.
pub fn clear_applied(store: &impl ConfigStore) -> Result<()> {
    let mut config = store.load()?;
    if config.applied.take().is_some() {
        store.save(&config)?;
    }
    Ok(())
}
