//! Guest VM configuration value.

use crate::domain::config::VmSettings;

/// Local port forwarded to the guest's SSH daemon.
pub const SSH_PORT: u16 = 41122;

/// Resources and connection details for the guest VM.
///
/// Built once when the orchestrator is assembled and handed to the VM
/// runtime, which owns it from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Number of vCPUs.
    pub cpu: u32,
    /// Disk size in GiB.
    pub disk: u32,
    /// Memory size in GiB.
    pub memory: u32,
    /// Host port forwarded to the guest SSH daemon.
    pub ssh_port: u16,
    /// Whether the requested resources differ from the saved ones.
    pub changed: bool,
}

impl VmConfig {
    /// Build the VM configuration for `requested`, flagging a change when it
    /// differs from `saved`.
    #[must_use]
    pub fn from_settings(requested: &VmSettings, saved: &VmSettings) -> Self {
        Self {
            cpu: requested.cpu,
            disk: requested.disk,
            memory: requested.memory,
            ssh_port: SSH_PORT,
            changed: requested != saved,
        }
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        let settings = VmSettings::default();
        Self::from_settings(&settings, &settings)
    }
}
