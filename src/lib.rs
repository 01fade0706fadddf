//! chunkscribe - chunked processing of long audio recordings
//!
//! Splits long recordings into bounded-duration segments, runs an external
//! per-segment tool on each, and reconciles the per-segment outputs into one
//! globally time-consistent transcript per source, with idempotent resume.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod cli;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod invoke;
pub mod locate;
pub mod orchestrate;
pub mod probe;
pub mod reconcile;
pub mod retime;
pub mod segment;
pub mod source;

// Pipeline surface
pub use config::Config;
pub use error::{PipelineError, Result};
pub use exec::{CommandExecutor, MockCommandExecutor, SystemCommandExecutor};
pub use invoke::{InvokeOutcome, RetryPolicy, SegmentInvoker};
pub use orchestrate::{Orchestrator, RunSummary};
pub use reconcile::{MergeOutcome, MergedTranscript, OffsetMode, Reconciler};
pub use retime::{RetimeSummary, Retimer};
pub use segment::{Segment, Segmenter};
pub use source::SourceRecording;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
