//! Application layer: port trait definitions, the staged pipeline, and
//! use-case orchestration.
//!
//! This module depends only on `crate::domain` and never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod pipeline;
pub mod ports;
pub mod services;

pub use pipeline::Pipeline;
pub use ports::{
    CommandRunner, ConfigStore, ContainerRuntime, Dependencies, DependencyLookup, GuestActions,
    GuestVm, HostActions, ProgressReporter,
};
