//! Testable execution of external commands.
//!
//! Every external process the pipeline runs (the splitter, the per-segment
//! tool) goes through the `CommandExecutor` trait, so retry and orchestration
//! logic can be exercised in tests without any tool installed.

use crate::error::{PipelineError, Result};
use std::process::Command;
use std::sync::Mutex;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use behind shared references.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion, discarding its stdout.
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn execute(&self, program: &str, args: &[&str]) -> Result<()>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<()> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::ToolNotFound {
                    tool: program.to_string(),
                }
            } else {
                PipelineError::ToolFailed {
                    tool: program.to_string(),
                    message: format!("failed to spawn: {}", e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::ToolFailed {
                tool: program.to_string(),
                message: format!(
                    "exited with {:?}: {}",
                    output.status.code(),
                    stderr.trim()
                ),
            });
        }

        Ok(())
    }
}

/// Mock command executor for testing.
///
/// Records every invocation and can be configured to fail the first N calls,
/// which is how the bounded-retry policy is exercised without sleeping on a
/// real tool.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<(String, Vec<String>)>,
    failures_remaining: u32,
}

impl MockCommandExecutor {
    /// Create a mock that succeeds on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail the first `n` calls.
    pub fn with_failures(self, n: u32) -> Self {
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .failures_remaining = n;
        self
    }

    /// All invocations recorded so far, as (program, args) pairs.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .calls
            .clone()
    }

    /// Number of invocations recorded so far.
    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .calls
            .len()
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.calls.push((
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(PipelineError::ToolFailed {
                tool: program.to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}
