//! Batch orchestration: segment → invoke → reconcile, per source recording.
//!
//! Strictly sequential: one source at a time, one segment at a time. The
//! external tools are assumed to own the accelerator device exclusively, so
//! at most one invocation is ever in flight.

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::exec::CommandExecutor;
use crate::invoke::{RetryPolicy, SegmentInvoker};
use crate::reconcile::{self, MergeOutcome, Reconciler};
use crate::segment::Segmenter;
use crate::source::{self, SourceRecording};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::collections::BTreeSet;
use std::time::Duration;

/// Final counts of a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Sources merged in this run.
    pub completed: usize,
    /// Sources whose terminal artifact already existed.
    pub skipped: usize,
    /// Sources whose merge was skipped due to missing segment results.
    pub merge_skipped: usize,
    /// Sources abandoned before the merge stage.
    pub failed: usize,
}

impl RunSummary {
    /// True when something went wrong for at least one source.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.merge_skipped > 0
    }
}

/// Drives the whole pipeline over every discovered source recording.
pub struct Orchestrator<'a, E: CommandExecutor> {
    config: &'a Config,
    executor: &'a E,
    quiet: bool,
    verbose: bool,
}

impl<'a, E: CommandExecutor> Orchestrator<'a, E> {
    pub fn new(config: &'a Config, executor: &'a E, quiet: bool, verbose: bool) -> Self {
        Self {
            config,
            executor,
            quiet,
            verbose,
        }
    }

    /// Process every source in discovery order.
    ///
    /// Per-segment failures never abort the source's remaining segments, and
    /// per-source failures never abort the batch. Only a missing raw-audio
    /// directory is fatal for the run.
    pub fn run(&self) -> Result<RunSummary> {
        let cfg = self.config;
        if !cfg.paths.raw_audio.is_dir() {
            return Err(PipelineError::MissingInput {
                path: cfg.paths.raw_audio.clone(),
            });
        }
        std::fs::create_dir_all(&cfg.paths.chunks)?;
        std::fs::create_dir_all(&cfg.paths.separated)?;
        std::fs::create_dir_all(&cfg.paths.transcripts)?;

        let discovery = source::discover_sources(&cfg.paths.raw_audio, self.quiet)?;
        let mut summary = RunSummary {
            failed: discovery.unreadable,
            ..RunSummary::default()
        };

        if !self.quiet {
            eprintln!(
                "Found {} source recording(s) in {}",
                discovery.sources.len(),
                cfg.paths.raw_audio.display()
            );
        }

        for src in &discovery.sources {
            self.process_source(src, &mut summary);
        }

        self.print_summary(&summary);
        Ok(summary)
    }

    fn process_source(&self, src: &SourceRecording, summary: &mut RunSummary) {
        let cfg = self.config;

        // Resume is purely existence-based: the merged pair is the terminal
        // artifact and the only signal that a source is done.
        let (merged_json, merged_txt) = reconcile::merged_paths(&cfg.paths.transcripts, &src.id);
        if merged_json.exists() && merged_txt.exists() {
            summary.skipped += 1;
            if !self.quiet {
                eprintln!("Already merged: {}, skipping", src.id);
            }
            return;
        }

        if !self.quiet {
            eprintln!("Processing {} ({:.1}s)", src.id, src.duration_secs);
        }

        let segmenter = Segmenter::new(self.executor, cfg.split.nominal_secs, self.quiet);
        let segments = match segmenter.split(src, &cfg.paths.chunks) {
            Ok(segments) if !segments.is_empty() => segments,
            Ok(_) => {
                if !self.quiet {
                    eprintln!("Split produced no segments for {}", src.id);
                }
                summary.failed += 1;
                return;
            }
            Err(e) => {
                if !self.quiet {
                    eprintln!("{}", e);
                }
                summary.failed += 1;
                return;
            }
        };

        let retry = RetryPolicy {
            max_attempts: cfg.retry.max_attempts,
            delay: Duration::from_secs(cfg.retry.delay_secs),
        };
        let invoker = SegmentInvoker::new(self.executor, &cfg.tool, retry, self.quiet, self.verbose);
        let out_dir = cfg.paths.separated.join(&src.id);

        let pb = self.segment_progress(segments.len());
        let mut failed_segments: BTreeSet<usize> = BTreeSet::new();
        for segment in &segments {
            if let Err(e) = invoker.process(segment, &out_dir) {
                if !self.quiet {
                    pb.suspend(|| eprintln!("{}", e));
                }
                failed_segments.insert(segment.index);
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let reconciler = Reconciler::new(cfg, self.quiet);
        match reconciler.merge(&src.id, &segments) {
            Ok(MergeOutcome::Merged {
                json, span_count, ..
            }) => {
                summary.completed += 1;
                if !self.quiet {
                    eprintln!("Merged {} span(s) into {}", span_count, json.display());
                }
            }
            Ok(MergeOutcome::Skipped { missing }) => {
                summary.merge_skipped += 1;
                if !self.quiet {
                    // Merge policy treats both cases the same, but the logs
                    // keep them apart for diagnosis.
                    for index in &missing {
                        let reason = if failed_segments.contains(index) {
                            "failed after retries this run"
                        } else {
                            "no result produced"
                        };
                        eprintln!("  segment {:03}: {}", index, reason);
                    }
                }
            }
            Err(e) => {
                summary.failed += 1;
                if !self.quiet {
                    eprintln!("Merge failed for {}: {}", src.id, e);
                }
            }
        }
    }

    fn segment_progress(&self, len: usize) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(segment_progress_style());
        pb
    }

    fn print_summary(&self, summary: &RunSummary) {
        if self.quiet {
            return;
        }
        eprintln!();
        eprintln!(
            "{} completed, {} skipped, {} merge-skipped, {} failed",
            summary.completed.green(),
            summary.skipped.cyan(),
            summary.merge_skipped.yellow(),
            summary.failed.red()
        );
    }
}

fn segment_progress_style() -> ProgressStyle {
    // SAFETY: hardcoded template string, always valid
    #[allow(clippy::expect_used)]
    ProgressStyle::default_bar()
        .template("[{bar:40.cyan/blue}] {pos}/{len} segments")
        .expect("hardcoded progress bar template")
        .progress_chars("#>-")
}
