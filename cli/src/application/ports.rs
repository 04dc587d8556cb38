//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::Output;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::BerthConfig;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Execution Ports ───────────────────────────────────────────────────────────

/// Command execution on the host machine.
#[async_trait(?Send)]
pub trait HostActions {
    /// Run `args[0]` with the remaining arguments; a non-zero exit is an error.
    async fn run(&self, args: &[&str]) -> Result<()>;
}

/// Command execution inside the guest VM.
#[async_trait(?Send)]
pub trait GuestActions {
    /// Run `args[0]` inside the guest; a non-zero exit is an error.
    async fn run(&self, args: &[&str]) -> Result<()>;
}

// ── Runtime Ports ─────────────────────────────────────────────────────────────

/// Host commands a component needs before it can be constructed.
pub trait Dependencies {
    fn dependencies(&self) -> &[&str];
}

/// The guest virtual machine all container runtimes live in.
#[async_trait(?Send)]
pub trait GuestVm: GuestActions + Dependencies {
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn teardown(&self) -> Result<()>;
    /// Host execution capability the VM was created with.
    fn host(&self) -> Rc<dyn HostActions>;
}

/// A container engine managed inside the guest VM.
///
/// Every fallible operation builds a fresh staged pipeline and runs it.
#[async_trait(?Send)]
pub trait ContainerRuntime: Dependencies {
    /// Stable identifier used in error messages and stage labels.
    fn name(&self) -> &str;
    /// Idempotent setup; enqueues only the steps still needed.
    async fn provision(&self) -> Result<()>;
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    /// Remove host-side artifacts left by provisioning, if any.
    async fn teardown(&self) -> Result<()>;
}

/// Answers whether a named command is available on the host.
pub trait DependencyLookup {
    fn is_available(&self, command: &str) -> bool;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Synchronous.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts persistence of user settings.
pub trait ConfigStore {
    /// Load settings, returning defaults when no file exists.
    fn load(&self) -> Result<BerthConfig>;
    /// Persist settings.
    fn save(&self, config: &BerthConfig) -> Result<()>;
    /// Location of the settings file.
    fn path(&self) -> Result<PathBuf>;
}
