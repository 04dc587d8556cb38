//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers that need to branch on a failure downcast.

use std::fmt;

use thiserror::Error;

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Lifecycle phase a fatal error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Provision,
    Stop,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "starting",
            Self::Provision => "provisioning",
            Self::Stop => "stopping",
            Self::Teardown => "during teardown of",
        })
    }
}

/// A lifecycle operation failed in `phase` for `component`.
#[derive(Debug, Error)]
#[error("error {phase} {component}")]
pub struct LifecycleError {
    pub phase: Phase,
    pub component: String,
    #[source]
    pub source: anyhow::Error,
}

impl LifecycleError {
    #[must_use]
    pub fn new(phase: Phase, component: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            phase,
            component: component.into(),
            source,
        }
    }
}

// ── Pipeline errors ───────────────────────────────────────────────────────────

/// A step failed while a staged pipeline was running.
///
/// `stage` is the label that was active when the failing step was added.
#[derive(Debug, Error)]
#[error("error at '{stage}'")]
pub struct StageError {
    pub pipeline: String,
    pub stage: String,
    #[source]
    pub source: anyhow::Error,
}

// ── Preflight errors ──────────────────────────────────────────────────────────

/// Errors raised before the orchestrator is constructed.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("dependency check failed for {component}: {} not found", .missing.join(", "))]
    Missing {
        component: String,
        missing: Vec<String>,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
