//! Structural tests for layer boundary enforcement.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and report whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

fn src(layer: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

/// Non-test, non-comment lines under `dir` containing any of `needles`.
fn find_outside_tests(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") {
                continue;
            }
            for needle in needles {
                if line.contains(needle) {
                    violations.push(format!("{rel}:{}: `{needle}`: {trimmed}", i + 1));
                }
            }
        }
    }
    violations
}

#[test]
fn domain_is_pure() {
    let violations = find_outside_tests(
        &src("domain"),
        &[
            "crate::application",
            "crate::infra",
            "crate::commands",
            "crate::output",
            "tokio::",
            "std::fs",
            "std::process",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay free of I/O and outer layers:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_depends_only_on_domain() {
    let violations = find_outside_tests(
        &src("application"),
        &["crate::infra", "crate::commands", "crate::output", "std::process::Command"],
    );
    assert!(
        violations.is_empty(),
        "application/ must not import infra/, commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations = find_outside_tests(&src("infra"), &["crate::commands", "crate::output"]);
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations = find_outside_tests(&src("infra"), &["println!", "eprintln!"]);
    assert!(
        violations.is_empty(),
        "infra/ reports progress through ProgressReporter or tracing:\n{}",
        violations.join("\n")
    );
}

#[test]
fn processes_are_spawned_only_by_the_command_runner() {
    let mut violations = Vec::new();
    for layer in ["application", "commands", "domain", "output"] {
        violations.extend(find_outside_tests(
            &src(layer),
            &["Command::new(", "TokioCommandRunner::new"],
        ));
    }
    assert!(
        violations.is_empty(),
        "spawn processes through the CommandRunner port:\n{}",
        violations.join("\n")
    );
}

#[test]
fn lifecycle_commands_print_through_output_context() {
    let violations: Vec<String> = find_outside_tests(&src("commands"), &["println!", "eprintln!"])
        .into_iter()
        .filter(|line| !line.contains("version.rs"))
        .collect();
    assert!(
        violations.is_empty(),
        "commands/ report through OutputContext:\n{}",
        violations.join("\n")
    );
}
