//! Host-side socket forwarding: the forwarding script and the launch agent
//! that keeps it running.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A per-user macOS launch agent identified by its label.
#[derive(Debug, Clone)]
pub struct LaunchAgent {
    label: String,
    dir: PathBuf,
}

impl LaunchAgent {
    pub fn new(label: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            dir: dir.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Path of the agent's plist.
    #[must_use]
    pub fn file(&self) -> PathBuf {
        self.dir.join(format!("{}.plist", self.label))
    }

    /// Plist that runs `script` and restarts it whenever it exits.
    #[must_use]
    pub fn plist(&self, script: &Path, log_dir: &Path) -> String {
        let log = log_dir.join(format!("{}.log", self.label));
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
        <string>/bin/sh</string>
        <string>{script}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <true/>
    <key>StandardOutPath</key>
    <string>{log}</string>
    <key>StandardErrorPath</key>
    <string>{log}</string>
</dict>
</plist>
"#,
            label = self.label,
            script = script.display(),
            log = log.display(),
        )
    }

    /// Write the plist to [`LaunchAgent::file`], creating its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write(&self, script: &Path, log_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.file();
        std::fs::write(&path, self.plist(script, log_dir))
            .with_context(|| format!("writing {}", path.display()))
    }
}

/// Shell script that forwards the guest docker socket to `socket` over SSH.
#[must_use]
fn socket_forwarding_script(socket: &Path, ssh_port: u16) -> String {
    let socket = socket.display();
    format!(
        r#"#!/bin/sh
rm -f "{socket}"
exec ssh -F /dev/null \
    -i "$HOME/.lima/_config/user" \
    -o IdentitiesOnly=yes \
    -o StrictHostKeyChecking=no \
    -o UserKnownHostsFile=/dev/null \
    -o NoHostAuthenticationForLocalhost=yes \
    -o ExitOnForwardFailure=yes \
    -L "{socket}:/var/run/docker.sock" \
    -N -p {ssh_port} 127.0.0.1
"#
    )
}

/// Write an executable forwarding script to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written or made executable.
pub fn write_socket_forwarding_script(path: &Path, socket: &Path, ssh_port: u16) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, socket_forwarding_script(socket, ssh_port))
        .with_context(|| format!("writing {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("setting permissions on {}", path.display()))?;
    }
    Ok(())
}

/// Remove `path` if it exists.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
}
