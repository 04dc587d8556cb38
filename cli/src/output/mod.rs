//! Terminal output for berth commands.

pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::domain::VmConfig;

/// Styling and verbosity shared by every command.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a terminal, and never with `--no-color` or `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let use_colors =
            !no_color && Term::stdout().is_term() && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }
        Self { styles, quiet }
    }

    /// `✓ msg`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// `⚠ msg`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Plain status line. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {msg}");
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Key with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// A notice framed by blank lines, shown before destructive prompts.
    pub fn banner(&self, lines: &[String]) {
        if self.quiet {
            return;
        }
        println!();
        for line in lines {
            println!("{line}");
        }
        println!();
    }

    /// Resources the VM was started with.
    pub fn vm_resources(&self, vm: &VmConfig) {
        for (key, value) in resource_rows(vm) {
            self.kv(key, &value);
        }
    }
}

/// Key/value rows describing a VM, keys padded to one width.
pub(crate) fn resource_rows(vm: &VmConfig) -> [(&'static str, String); 4] {
    [
        ("cpus  ", vm.cpu.to_string()),
        ("memory", format!("{} GiB", vm.memory)),
        ("disk  ", format!("{} GiB", vm.disk)),
        ("ssh   ", format!("127.0.0.1:{}", vm.ssh_port)),
    ]
}
