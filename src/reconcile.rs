//! Reconciliation of per-segment results into one globally-timed transcript.
//!
//! Per-segment timestamps are local to their segment. Merging shifts them by
//! a per-segment offset, computed in one of two modes:
//!
//! - dynamic accumulation: offset of segment i is the sum of the measured
//!   durations of segments 0..i-1, used when local timestamps come from
//!   variable-length upstream audio;
//! - fixed nominal: offset of segment i is `i * nominal_length`, used when
//!   regenerating timestamps from the segment index and WAV duration alone.
//!
//! The two modes serve different pipeline stages and are selected explicitly
//! by the caller; they must not be conflated.

use crate::config::Config;
use crate::defaults;
use crate::error::{PipelineError, Result};
use crate::locate;
use crate::segment::Segment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A time span relative to the start of the full source recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSpan {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// A time span relative to the start of its own segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSpan {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Parsed result of one segment.
#[derive(Debug, Clone)]
pub struct SegmentResult {
    pub index: usize,
    /// Flattened text of the segment, independent of the span list.
    pub text: String,
    pub spans: Vec<LocalSpan>,
}

/// How per-segment offsets are computed during a merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetMode {
    /// Offset of segment i = sum of measured durations of segments 0..i-1.
    DynamicAccumulation,
    /// Offset of segment i = i * nominal length.
    FixedNominal { nominal_secs: f64 },
}

/// The terminal artifact of one source recording.
#[derive(Debug, Clone)]
pub struct MergedTranscript {
    pub source_id: String,
    pub spans: Vec<GlobalSpan>,
    /// Per-segment texts joined with newlines, in index order.
    pub full_text: String,
}

/// Outcome of a merge attempt.
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    Merged {
        json: PathBuf,
        txt: PathBuf,
        span_count: usize,
    },
    /// The segment set was incomplete; nothing was written or overwritten.
    Skipped { missing: Vec<usize> },
}

/// Parse one persisted per-segment result file.
///
/// The expected shape is a JSON array of `{timestamp: [start, end], text}`
/// records. Entries with a null, missing, or non-numeric timestamp pair are
/// dropped individually (their text still counts toward the segment text);
/// a wholly unparseable file degrades to an empty result. Neither case is
/// fatal; the merge continues with what parses.
pub fn parse_result_file(path: &Path, index: usize, quiet: bool) -> SegmentResult {
    let mut spans = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    let mut dropped = 0usize;

    match read_entries(path) {
        Ok(entries) => {
            for entry in &entries {
                let text = entry
                    .get("text")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                match parse_timestamp(entry.get("timestamp")) {
                    Some((start, end)) => spans.push(LocalSpan {
                        start,
                        end,
                        text: text.clone(),
                    }),
                    None => dropped += 1,
                }
                if !text.is_empty() {
                    texts.push(text);
                }
            }
        }
        Err(message) => {
            if !quiet {
                eprintln!("Unparseable result file {}: {}", path.display(), message);
            }
        }
    }

    if dropped > 0 && !quiet {
        eprintln!(
            "Dropped {} malformed entry(ies) in {}",
            dropped,
            path.display()
        );
    }

    let mut text = texts.join(" ");
    if text.is_empty() {
        // Some tools write the flattened text as a sibling .txt next to the
        // span file; fall back to it when the entries carry no text.
        let sibling = path.with_extension("txt");
        if let Ok(contents) = std::fs::read_to_string(&sibling) {
            text = contents.trim().to_string();
        }
    }

    SegmentResult { index, text, spans }
}

fn read_entries(path: &Path) -> std::result::Result<Vec<serde_json::Value>, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    match value {
        serde_json::Value::Array(entries) => Ok(entries),
        _ => Err("top-level value is not an array".to_string()),
    }
}

fn parse_timestamp(value: Option<&serde_json::Value>) -> Option<(f64, f64)> {
    let pair = value?.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    Some((pair[0].as_f64()?, pair[1].as_f64()?))
}

/// Shift per-segment results into global time and flatten the texts.
///
/// `items` must be ordered by segment index and carry each segment's actual
/// measured duration. Offsets are f64 seconds with no rounding beyond input
/// precision. Empty segment texts are omitted from the joined text.
pub fn merge_results(
    source_id: &str,
    items: &[(SegmentResult, f64)],
    mode: OffsetMode,
) -> MergedTranscript {
    let mut spans = Vec::new();
    let mut texts = Vec::new();
    let mut cumulative = 0.0f64;

    for (result, duration) in items {
        let offset = match mode {
            OffsetMode::DynamicAccumulation => cumulative,
            OffsetMode::FixedNominal { nominal_secs } => result.index as f64 * nominal_secs,
        };
        for span in &result.spans {
            spans.push(GlobalSpan {
                start: offset + span.start,
                end: offset + span.end,
                text: span.text.clone(),
            });
        }
        if !result.text.is_empty() {
            texts.push(result.text.clone());
        }
        cumulative += duration;
    }

    MergedTranscript {
        source_id: source_id.to_string(),
        spans,
        full_text: texts.join("\n"),
    }
}

/// Paths of the two merged artifacts for a source: `<id>_merged.json` and
/// `<id>_merged.txt`. Their joint existence signals the source is done.
pub fn merged_paths(transcripts_dir: &Path, source_id: &str) -> (PathBuf, PathBuf) {
    (
        transcripts_dir.join(format!("{}{}", source_id, defaults::MERGED_JSON_SUFFIX)),
        transcripts_dir.join(format!("{}{}", source_id, defaults::MERGED_TXT_SUFFIX)),
    )
}

/// Write `contents` to `path` via a temp file and atomic rename, so a crash
/// mid-write never leaves a truncated terminal artifact.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let Some(name) = path.file_name() else {
        return Err(PipelineError::Other(format!(
            "not a writable file path: {}",
            path.display()
        )));
    };
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Persist both merged artifacts for a source.
pub fn write_merged(transcripts_dir: &Path, merged: &MergedTranscript) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(transcripts_dir)?;
    let (json_path, txt_path) = merged_paths(transcripts_dir, &merged.source_id);
    let json = serde_json::to_string_pretty(&merged.spans)?;
    write_atomic(&json_path, json.as_bytes())?;
    write_atomic(&txt_path, merged.full_text.as_bytes())?;
    Ok((json_path, txt_path))
}

/// Collects per-segment results for one source and merges them.
pub struct Reconciler<'a> {
    config: &'a Config,
    quiet: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a Config, quiet: bool) -> Self {
        Self { config, quiet }
    }

    /// Merge all segment results of `source_id` with dynamic-accumulation
    /// offsets.
    ///
    /// If any segment's result cannot be resolved the merge is skipped for
    /// the whole source: no partial file is produced and an existing merged
    /// artifact is left untouched.
    pub fn merge(&self, source_id: &str, segments: &[Segment]) -> Result<MergeOutcome> {
        let out_root = self.config.paths.separated.join(source_id);
        let mut items = Vec::with_capacity(segments.len());
        let mut missing = Vec::new();

        for segment in segments {
            match locate::locate(
                &out_root,
                &self.config.tool.model,
                segment.stem(),
                &self.config.tool.result_file,
            ) {
                Some(path) => items.push((
                    parse_result_file(&path, segment.index, self.quiet),
                    segment.duration_secs,
                )),
                None => missing.push(segment.index),
            }
        }

        if !missing.is_empty() {
            if !self.quiet {
                eprintln!(
                    "Skipping merge for {}: missing {} of {} segment result(s)",
                    source_id,
                    missing.len(),
                    segments.len()
                );
            }
            return Ok(MergeOutcome::Skipped { missing });
        }

        let merged = merge_results(source_id, &items, OffsetMode::DynamicAccumulation);
        let span_count = merged.spans.len();
        let (json, txt) = write_merged(&self.config.paths.transcripts, &merged)?;
        Ok(MergeOutcome::Merged {
            json,
            txt,
            span_count,
        })
    }
}
