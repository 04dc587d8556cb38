//! Domain layer: pure types, validation, and error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod vm;

pub use config::{BerthConfig, VmSettings, validate_config_key, validate_config_value};
pub use error::{ConfigError, DependencyError, LifecycleError, Phase, StageError};
pub use vm::{SSH_PORT, VmConfig};
