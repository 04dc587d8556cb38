//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the Lima
//! guest VM, the docker runtime adapter and on-disk settings.
//!
//! Imports from `crate::domain` and `crate::application` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod docker;
pub mod host;
pub mod lima;
pub mod paths;

#[cfg(test)]
pub(crate) mod test_support;
