//! Shared test helpers for infrastructure tests.
//!
//! Provides cross-platform `exit_status()`, canned `Output` constructors, and
//! a `CommandRunner` that records invocations and replays scripted results.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::CommandRunner;

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

/// Records every `program args...` line and answers from a script.
///
/// Each call pops the next scripted output; once the script is exhausted
/// every call succeeds with empty output.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: RefCell<Vec<String>>,
    script: RefCell<VecDeque<Output>>,
}

impl RecordingRunner {
    pub fn with_script(outputs: Vec<Output>) -> Self {
        Self {
            calls: RefCell::default(),
            script: RefCell::new(outputs.into()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, Duration::ZERO).await
    }

    async fn run_with_timeout(&self, program: &str, args: &[&str], _: Duration) -> Result<Output> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.borrow_mut().push(line);
        Ok(self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| ok_output(b"")))
    }
}
