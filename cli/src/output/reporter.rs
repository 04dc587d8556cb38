//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Application services and runtime adapters hold the reporter behind an
//! `Rc<dyn ProgressReporter>`, so it owns a copy of the stylesheet instead of
//! borrowing the `OutputContext`.

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, Styles};

/// Terminal progress reporter.
///
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
///
/// All three are suppressed when quiet.
pub struct TerminalReporter {
    styles: Styles,
    quiet: bool,
}

impl TerminalReporter {
    #[must_use]
    pub fn new(ctx: &OutputContext) -> Self {
        Self {
            styles: ctx.styles.clone(),
            quiet: ctx.quiet,
        }
    }

    fn line(&self, marker: &str, style: owo_colors::Style, message: &str) -> Option<String> {
        (!self.quiet).then(|| format!("  {} {message}", marker.style(style)))
    }
}

impl ProgressReporter for TerminalReporter {
    fn step(&self, message: &str) {
        if let Some(line) = self.line("→", self.styles.step, message) {
            println!("{line}");
        }
    }

    fn success(&self, message: &str) {
        if let Some(line) = self.line("✓", self.styles.success, message) {
            println!("{line}");
        }
    }

    fn warn(&self, message: &str) {
        if let Some(line) = self.line("!", self.styles.warning, message) {
            eprintln!("{line}");
        }
    }
}
