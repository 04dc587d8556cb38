//! Staged task runner.
//!
//! A `Pipeline` is an ordered list of deferred steps, each tagged with the
//! stage label that was active when it was added. Running it awaits the steps
//! one at a time in insertion order and stops at the first failure.
//!
//! ```text
//! let mut p = Pipeline::new("docker");
//! p.stage("starting");
//! p.add(guest.run(&["sudo", "service", "docker", "start"]));
//! p.run(&reporter).await?;
//! ```
//!
//! Steps are futures, so nothing executes until `run` polls them. Each
//! adapter operation builds a new pipeline; a pipeline is consumed by `run`.

use std::future::Future;

use anyhow::Result;
use futures_util::future::LocalBoxFuture;

use crate::application::ports::ProgressReporter;
use crate::domain::StageError;

/// A deferred unit of work.
pub type Step<'a> = LocalBoxFuture<'a, Result<()>>;

pub struct Pipeline<'a> {
    name: String,
    stage: String,
    steps: Vec<(String, Step<'a>)>,
}

impl<'a> Pipeline<'a> {
    /// Create an empty pipeline. The active stage starts as `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            stage: name.clone(),
            name,
            steps: Vec::new(),
        }
    }

    /// Set the label attached to every step added after this call.
    pub fn stage(&mut self, label: impl Into<String>) {
        self.stage = label.into();
    }

    /// Append a step under the active stage.
    pub fn add(&mut self, step: impl Future<Output = Result<()>> + 'a) {
        self.steps.push((self.stage.clone(), Box::pin(step)));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Stage label of each queued step, in run order.
    #[must_use]
    pub fn stages(&self) -> Vec<&str> {
        self.steps.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// A progress line is emitted whenever the stage label changes.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] carrying the failing step's stage label.
    pub async fn run(self, reporter: &(impl ProgressReporter + ?Sized)) -> Result<(), StageError> {
        let Self { name, steps, .. } = self;
        let total = steps.len();
        let mut current: Option<String> = None;

        for (index, (label, step)) in steps.into_iter().enumerate() {
            if current.as_deref() != Some(label.as_str()) {
                reporter.step(&format!("{name}: {label}"));
                tracing::info!(pipeline = %name, stage = %label, "stage");
                current = Some(label.clone());
            }
            tracing::debug!(
                pipeline = %name,
                stage = %label,
                step = index + 1,
                total,
                "running step"
            );
            if let Err(source) = step.await {
                tracing::debug!(pipeline = %name, stage = %label, error = %source, "step failed");
                return Err(StageError {
                    pipeline: name,
                    stage: label,
                    source,
                });
            }
        }
        Ok(())
    }
}
