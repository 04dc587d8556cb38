//! Well-known host paths.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;

/// Application name used for directories and launch agent labels.
pub const APP_NAME: &str = "berth";

/// Per-application directory: `$BERTH_HOME`, or `~/.berth`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn app_dir() -> Result<PathBuf> {
    resolve_app_dir(std::env::var_os("BERTH_HOME"), dirs::home_dir())
}

/// Directory the macOS service manager loads per-user agents from.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn launch_agents_dir() -> Result<PathBuf> {
    Ok(require_home(dirs::home_dir())?
        .join("Library")
        .join("LaunchAgents"))
}

fn resolve_app_dir(override_dir: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(require_home(home)?.join(format!(".{APP_NAME}"))),
    }
}

fn require_home(home: Option<PathBuf>) -> Result<PathBuf> {
    home.ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))
}
