//! Domain types and validators for Berth configuration.
//!
//! Pure functions only. No I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &["vm.cpu", "vm.memory", "vm.disk"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.berth/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BerthConfig {
    /// Guest VM resources the user asked for.
    #[serde(default)]
    pub vm: VmSettings,
    /// Resources the VM last started with. Absent until the first
    /// successful start and after `delete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<VmSettings>,
}

/// User-facing VM resource settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VmSettings {
    /// Number of vCPUs.
    pub cpu: u32,
    /// Memory in GiB.
    pub memory: u32,
    /// Disk in GiB.
    pub disk: u32,
}

impl Default for VmSettings {
    fn default() -> Self {
        Self {
            cpu: 2,
            memory: 2,
            disk: 60,
        }
    }
}

impl VmSettings {
    /// Apply optional per-invocation overrides on top of these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any override is zero.
    pub fn with_overrides(
        &self,
        cpu: Option<u32>,
        memory: Option<u32>,
        disk: Option<u32>,
    ) -> Result<Self> {
        let mut out = self.clone();
        if let Some(v) = cpu {
            out.cpu = ensure_positive("vm.cpu", v)?;
        }
        if let Some(v) = memory {
            out.memory = ensure_positive("vm.memory", v)?;
        }
        if let Some(v) = disk {
            out.disk = ensure_positive("vm.disk", v)?;
        }
        Ok(out)
    }

    /// Set a value by its dotted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        let parsed = parse_resource(key, value)?;
        match key {
            "vm.cpu" => self.cpu = parsed,
            "vm.memory" => self.memory = parsed,
            _ => self.disk = parsed,
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not a positive integer.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    parse_resource(key, value).map(|_| ())
}

fn parse_resource(key: &str, value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(n) => ensure_positive(key, n),
        Err(_) => Err(invalid(key, value)),
    }
}

fn ensure_positive(key: &str, n: u32) -> Result<u32> {
    if n == 0 {
        return Err(invalid(key, "0"));
    }
    Ok(n)
}

fn invalid(key: &str, value: &str) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: "a positive integer".to_string(),
    }
    .into()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
