//! Default configuration constants for chunkscribe.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

/// Default nominal segment length in seconds.
///
/// 30 seconds keeps each external-tool invocation short enough to fit on a
/// single accelerator pass while producing few enough segments that the
/// per-invocation startup cost stays tolerable.
pub const NOMINAL_SEGMENT_SECS: f64 = 30.0;

/// Zero-padding width of the segment index in file names.
///
/// Three digits guarantee that lexical sort order equals temporal order for
/// recordings of up to 1000 segments (over 8 hours at the default length).
pub const SEGMENT_INDEX_WIDTH: usize = 3;

/// Program used to split source recordings.
pub const SPLIT_PROGRAM: &str = "ffmpeg";

/// Default per-segment external tool.
pub const TOOL_PROGRAM: &str = "whisper-cli";

/// Default model identifier passed to the external tool.
pub const TOOL_MODEL: &str = "medium";

/// Default inference device passed to the external tool.
pub const TOOL_DEVICE: &str = "cuda";

/// Default internal segment-length hint passed to the external tool.
///
/// Some tools (demucs in particular) re-chunk their input internally; the
/// hint bounds their working-set size on the device.
pub const TOOL_SEGMENT_HINT: u32 = 7;

/// File name of the per-segment result artifact the tool is expected to
/// produce somewhere under its output tree.
pub const TOOL_RESULT_FILE: &str = "transcript.json";

/// Maximum invocation attempts per segment before marking it failed.
pub const MAX_TOOL_ATTEMPTS: u32 = 3;

/// Delay between invocation attempts, in seconds.
pub const RETRY_DELAY_SECS: u64 = 5;

/// Default directory of normalized source recordings.
pub const RAW_AUDIO_DIR: &str = "data/raw_audio";

/// Default directory for per-source segment subdirectories.
pub const CHUNKS_DIR: &str = "data/chunks";

/// Default root for external-tool output trees.
pub const SEPARATED_DIR: &str = "data/separated_audio";

/// Default directory for per-source merged transcripts.
pub const TRANSCRIPTS_DIR: &str = "data/transcripts_chunks";

/// Suffix of the merged span-list artifact.
pub const MERGED_JSON_SUFFIX: &str = "_merged.json";

/// Suffix of the merged plain-text artifact.
pub const MERGED_TXT_SUFFIX: &str = "_merged.txt";
