//! Preflight dependency validation.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{Dependencies, DependencyLookup};
use crate::domain::DependencyError;

/// Verify that every command `component` declares is available.
///
/// All missing commands are collected so the user can install them in one go.
///
/// # Errors
///
/// Returns [`DependencyError::Missing`] if any declared command is absent.
pub fn check(
    component: &str,
    deps: &(impl Dependencies + ?Sized),
    lookup: &impl DependencyLookup,
) -> Result<(), DependencyError> {
    let missing: Vec<String> = deps
        .dependencies()
        .iter()
        .filter(|cmd| !lookup.is_available(cmd))
        .map(|cmd| (*cmd).to_string())
        .collect();

    if missing.is_empty() {
        tracing::debug!(component, "dependencies satisfied");
        return Ok(());
    }
    Err(DependencyError::Missing {
        component: component.to_string(),
        missing,
    })
}
