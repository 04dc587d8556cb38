//! Lifecycle orchestration across the guest VM and its container runtimes.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! ```text
//! start:  vm start -> provision each runtime -> start each runtime
//! stop:   stop each runtime (best effort) -> vm stop
//! delete: teardown each runtime (best effort) -> vm teardown
//! ```

use std::rc::Rc;

use anyhow::Result;

use crate::application::ports::{ContainerRuntime, DependencyLookup, GuestVm};
use crate::application::services::preflight;
use crate::domain::{DependencyError, LifecycleError, Phase};

/// Component name used for the guest VM in errors and logs.
pub const VM_COMPONENT: &str = "vm";

/// Owns the guest VM and the ordered list of container runtimes inside it.
pub struct Orchestrator {
    vm: Rc<dyn GuestVm>,
    containers: Vec<Box<dyn ContainerRuntime>>,
}

impl Orchestrator {
    /// Validate dependencies of the VM and every runtime, then assemble.
    ///
    /// Runtimes are provisioned and started in the order given here.
    ///
    /// # Errors
    ///
    /// Returns the first [`DependencyError`] found; the VM is checked first.
    pub fn new(
        vm: Rc<dyn GuestVm>,
        containers: Vec<Box<dyn ContainerRuntime>>,
        lookup: &impl DependencyLookup,
    ) -> Result<Self, DependencyError> {
        preflight::check(VM_COMPONENT, vm.as_ref(), lookup)?;
        for runtime in &containers {
            preflight::check(runtime.name(), runtime.as_ref(), lookup)?;
        }
        Ok(Self { vm, containers })
    }

    /// Names of the configured runtimes, in order.
    pub fn runtime_names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|r| r.name())
    }

    /// Start the VM, then provision every runtime, then start every runtime.
    ///
    /// No runtime is started until all of them are provisioned.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] for the first phase that fails; nothing
    /// after it is attempted.
    pub async fn start(&self) -> Result<()> {
        self.vm
            .start()
            .await
            .map_err(|e| LifecycleError::new(Phase::Start, VM_COMPONENT, e))?;

        for runtime in &self.containers {
            runtime
                .provision()
                .await
                .map_err(|e| LifecycleError::new(Phase::Provision, runtime.name(), e))?;
        }

        for runtime in &self.containers {
            runtime
                .start()
                .await
                .map_err(|e| LifecycleError::new(Phase::Start, runtime.name(), e))?;
        }

        Ok(())
    }

    /// Stop every runtime, then stop the VM.
    ///
    /// Runtime failures are logged and skipped; the VM stop always runs.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] only if the VM fails to stop.
    pub async fn stop(&self) -> Result<()> {
        for runtime in &self.containers {
            if let Err(e) = runtime.stop().await {
                let err = LifecycleError::new(Phase::Stop, runtime.name(), e);
                let chain = format!("{:#}", anyhow::Error::from(err));
                tracing::warn!(runtime = runtime.name(), error = %chain, "runtime stop failed");
            }
        }

        self.vm
            .stop()
            .await
            .map_err(|e| LifecycleError::new(Phase::Stop, VM_COMPONENT, e))?;
        Ok(())
    }

    /// Tear down every runtime, then tear down the VM.
    ///
    /// Runtime teardown removes host-side artifacts the VM teardown cannot
    /// reach. Failures there are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] only if the VM teardown fails.
    pub async fn delete(&self) -> Result<()> {
        for runtime in &self.containers {
            if let Err(e) = runtime.teardown().await {
                let err = LifecycleError::new(Phase::Teardown, runtime.name(), e);
                let chain = format!("{:#}", anyhow::Error::from(err));
                tracing::warn!(runtime = runtime.name(), error = %chain, "runtime teardown failed");
            }
        }

        self.vm
            .teardown()
            .await
            .map_err(|e| LifecycleError::new(Phase::Teardown, VM_COMPONENT, e))?;
        Ok(())
    }
}
