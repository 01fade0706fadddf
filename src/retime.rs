//! Fixed-nominal timestamp repair for previously-written per-segment results.
//!
//! Rebuilds timestamps from the segment index and WAV duration alone,
//! independent of whatever local timestamps the tool produced: segment i of
//! nominal length L spans `[i*L, i*L + actual_duration)`. Each per-segment
//! JSON is rewritten to a single repaired span and the merged pair is
//! rebuilt. No re-transcription happens.

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::probe;
use crate::reconcile::{self, LocalSpan, OffsetMode, SegmentResult};
use crate::segment::{parse_segment_index, sorted_wavs};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Final counts of a repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetimeSummary {
    /// Sources whose per-segment files and merged pair were rebuilt.
    pub repaired: usize,
    /// Transcript directories with no matching segment audio.
    pub skipped: usize,
    /// Sources left untouched because the segment set was incomplete.
    pub merge_skipped: usize,
}

impl RetimeSummary {
    pub fn has_failures(&self) -> bool {
        self.merge_skipped > 0
    }
}

/// One repairable segment: its transcript file and measured duration.
struct RepairItem {
    index: usize,
    stem: String,
    json_path: PathBuf,
    duration_secs: f64,
}

/// Walks per-source transcript directories and repairs their timestamps.
pub struct Retimer<'a> {
    config: &'a Config,
    quiet: bool,
}

impl<'a> Retimer<'a> {
    pub fn new(config: &'a Config, quiet: bool) -> Self {
        Self { config, quiet }
    }

    /// Repair every per-source transcript directory found under the
    /// transcripts root.
    ///
    /// A source is only rewritten when every segment WAV has a parseable
    /// index and a transcript file; otherwise the whole source is left
    /// untouched, with the unresolved count logged.
    pub fn run(&self) -> Result<RetimeSummary> {
        let transcripts = &self.config.paths.transcripts;
        let chunks = &self.config.paths.chunks;
        if !transcripts.is_dir() {
            return Err(PipelineError::MissingInput {
                path: transcripts.clone(),
            });
        }
        if !chunks.is_dir() {
            return Err(PipelineError::MissingInput {
                path: chunks.clone(),
            });
        }

        let mut folders: Vec<PathBuf> = std::fs::read_dir(transcripts)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        folders.sort();

        let mut summary = RetimeSummary::default();
        for folder in folders {
            self.repair_source(&folder, &mut summary)?;
        }

        if !self.quiet {
            eprintln!();
            eprintln!(
                "{} repaired, {} skipped, {} merge-skipped",
                summary.repaired.green(),
                summary.skipped.cyan(),
                summary.merge_skipped.yellow()
            );
        }
        Ok(summary)
    }

    fn repair_source(&self, folder: &Path, summary: &mut RetimeSummary) -> Result<()> {
        let source_id = folder
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let wav_dir = self.config.paths.chunks.join(&source_id);
        if !wav_dir.is_dir() {
            summary.skipped += 1;
            if !self.quiet {
                eprintln!("No segment audio for {}, skipping", source_id);
            }
            return Ok(());
        }

        let wavs = sorted_wavs(&wav_dir)?;
        if wavs.is_empty() {
            summary.skipped += 1;
            if !self.quiet {
                eprintln!("No segment audio for {}, skipping", source_id);
            }
            return Ok(());
        }

        let (items, unresolved) = self.collect_items(folder, &wavs);
        if !unresolved.is_empty() {
            summary.merge_skipped += 1;
            if !self.quiet {
                eprintln!(
                    "Skipping repair for {}: {} of {} segment(s) unresolved",
                    source_id,
                    unresolved.len(),
                    wavs.len()
                );
                for reason in &unresolved {
                    eprintln!("  {}", reason);
                }
            }
            return Ok(());
        }

        // All segments resolved: compute the repaired spans in one pass...
        let results: Vec<(SegmentResult, f64)> = items
            .iter()
            .map(|item| {
                // Only the text is wanted here; already-repaired files carry
                // no timestamp pairs, so parse diagnostics stay suppressed.
                let parsed = reconcile::parse_result_file(&item.json_path, item.index, true);
                let result = SegmentResult {
                    index: item.index,
                    text: parsed.text.clone(),
                    spans: vec![LocalSpan {
                        start: 0.0,
                        end: item.duration_secs,
                        text: parsed.text,
                    }],
                };
                (result, item.duration_secs)
            })
            .collect();

        let merged = reconcile::merge_results(
            &source_id,
            &results,
            OffsetMode::FixedNominal {
                nominal_secs: self.config.split.nominal_secs,
            },
        );

        // ...then rewrite each per-segment file and rebuild the merged pair.
        for (item, span) in items.iter().zip(&merged.spans) {
            let repaired = serde_json::to_string_pretty(&[span])?;
            reconcile::write_atomic(&item.json_path, repaired.as_bytes())?;
            if !self.quiet {
                eprintln!(
                    "  {}: {:.1}s - {:.1}s",
                    item.stem, span.start, span.end
                );
            }
        }
        reconcile::write_merged(&self.config.paths.transcripts, &merged)?;

        summary.repaired += 1;
        if !self.quiet {
            eprintln!(
                "Rebuilt timestamps for {} ({} segment(s))",
                source_id,
                items.len()
            );
        }
        Ok(())
    }

    /// First pass over the segment WAVs: probe durations and require a
    /// transcript file and parseable index for each. Returns the repairable
    /// items plus human-readable reasons for everything unresolved.
    fn collect_items(&self, folder: &Path, wavs: &[PathBuf]) -> (Vec<RepairItem>, Vec<String>) {
        let mut items = Vec::with_capacity(wavs.len());
        let mut unresolved = Vec::new();

        for wav in wavs {
            let stem = wav
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let Some(index) = parse_segment_index(&stem) else {
                unresolved.push(format!("{}: no trailing segment index", stem));
                continue;
            };
            let json_path = folder.join(format!("{}.json", stem));
            if !json_path.is_file() {
                unresolved.push(format!("{}: no transcript file", stem));
                continue;
            }
            match probe::wav_duration_secs(wav) {
                Ok(duration_secs) => items.push(RepairItem {
                    index,
                    stem,
                    json_path,
                    duration_secs,
                }),
                Err(e) => unresolved.push(format!("{}: {}", stem, e)),
            }
        }

        (items, unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.paths.chunks = root.join("chunks");
        config.paths.transcripts = root.join("transcripts");
        config
    }

    #[test]
    fn test_missing_transcripts_dir_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.paths.chunks).expect("mkdir");

        let result = Retimer::new(&config, true).run();
        assert!(matches!(result, Err(PipelineError::MissingInput { .. })));
    }

    #[test]
    fn test_missing_chunks_dir_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.paths.transcripts).expect("mkdir");

        let result = Retimer::new(&config, true).run();
        assert!(matches!(result, Err(PipelineError::MissingInput { .. })));
    }

    #[test]
    fn test_folder_without_segment_audio_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.paths.chunks).expect("mkdir");
        std::fs::create_dir_all(config.paths.transcripts.join("orphan")).expect("mkdir");

        let summary = Retimer::new(&config, true).run().expect("run");
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.repaired, 0);
    }

    #[test]
    fn test_merged_files_in_transcripts_root_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.paths.chunks).expect("mkdir");
        std::fs::create_dir_all(&config.paths.transcripts).expect("mkdir");
        std::fs::write(config.paths.transcripts.join("x_merged.json"), "[]").expect("write");

        let summary = Retimer::new(&config, true).run().expect("run");
        assert_eq!(summary, RetimeSummary::default());
    }
}
