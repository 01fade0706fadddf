//! Per-segment invocation of the external tool, with bounded retry.
//!
//! The retry policy is a standalone value so it can be tested against a
//! failing stub without touching invocation logic. The invoker itself only
//! decides skip-or-run and assembles the command line.

use crate::config::ToolConfig;
use crate::error::{PipelineError, Result};
use crate::exec::CommandExecutor;
use crate::locate;
use crate::segment::Segment;
use std::path::Path;
use std::time::{Duration, Instant};

/// Bounded retry: a fixed number of attempts with a fixed delay in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::defaults::MAX_TOOL_ATTEMPTS,
            delay: Duration::from_secs(crate::defaults::RETRY_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or attempts are exhausted.
    ///
    /// `on_fail` is called once per failed attempt with the attempt number
    /// (1-based) and the error, before any inter-attempt delay.
    pub fn run<T, F, L>(&self, mut op: F, mut on_fail: L) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
        L: FnMut(u32, &PipelineError),
    {
        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    on_fail(attempt, &e);
                    last_error = Some(e);
                    if attempt < self.max_attempts && !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| PipelineError::Other("retry policy with zero attempts".to_string())))
    }
}

/// Outcome of processing one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// A usable result already existed; the tool was not invoked.
    Skipped,
    /// The tool ran to completion.
    Processed,
}

/// Runs the external tool on single segments.
pub struct SegmentInvoker<'a, E: CommandExecutor> {
    executor: &'a E,
    tool: &'a ToolConfig,
    retry: RetryPolicy,
    quiet: bool,
    verbose: bool,
}

impl<'a, E: CommandExecutor> SegmentInvoker<'a, E> {
    pub fn new(
        executor: &'a E,
        tool: &'a ToolConfig,
        retry: RetryPolicy,
        quiet: bool,
        verbose: bool,
    ) -> Self {
        Self {
            executor,
            tool,
            retry,
            quiet,
            verbose,
        }
    }

    /// Process one segment, writing tool output under `out_dir`.
    ///
    /// Skips the invocation when the result is already resolvable. A failure
    /// after exhausted retries affects this segment only; the caller decides
    /// what to do with its siblings.
    pub fn process(&self, segment: &Segment, out_dir: &Path) -> Result<InvokeOutcome> {
        let stem = segment.stem();

        if locate::locate(out_dir, &self.tool.model, stem, &self.tool.result_file).is_some() {
            if self.verbose {
                eprintln!("Result already exists for {}, skipping", stem);
            }
            return Ok(InvokeOutcome::Skipped);
        }

        std::fs::create_dir_all(out_dir)?;

        let args = self.build_args(segment, out_dir);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        if self.verbose {
            eprintln!("Running {} on {}", self.tool.program, stem);
        }
        let started = Instant::now();

        let attempts = self.retry.max_attempts;
        self.retry
            .run(
                |_attempt| self.executor.execute(&self.tool.program, &arg_refs),
                |attempt, error| {
                    if !self.quiet {
                        eprintln!(
                            "Attempt {}/{} failed for {}: {}",
                            attempt, attempts, stem, error
                        );
                    }
                },
            )
            .map_err(|e| PipelineError::RetriesExhausted {
                segment: stem.to_string(),
                attempts,
                message: e.to_string(),
            })?;

        if self.verbose {
            eprintln!("Done {} in {:.1}s", stem, started.elapsed().as_secs_f64());
        }
        Ok(InvokeOutcome::Processed)
    }

    fn build_args(&self, segment: &Segment, out_dir: &Path) -> Vec<String> {
        let mut args: Vec<String> = self.tool.extra_args.clone();
        args.push("-n".to_string());
        args.push(self.tool.model.clone());
        args.push("--device".to_string());
        args.push(self.tool.device.clone());
        args.push("--segment".to_string());
        args.push(self.tool.segment_hint.to_string());
        args.push(segment.path.to_string_lossy().to_string());
        args.push("-o".to_string());
        args.push(out_dir.to_string_lossy().to_string());
        args
    }
}
