//! Lossless splitting of source recordings into bounded-duration segments.
//!
//! Uses the ffmpeg segment muxer in stream-copy mode, so no re-encoding ever
//! happens. Segment names carry a zero-padded index, guaranteeing that
//! lexical sort order equals temporal order.

use crate::defaults;
use crate::error::{PipelineError, Result};
use crate::exec::CommandExecutor;
use crate::probe;
use crate::source::SourceRecording;
use std::path::{Path, PathBuf};

/// One slice of a source recording, processed independently.
#[derive(Debug, Clone)]
pub struct Segment {
    pub source_id: String,
    /// 0-based, contiguous per source.
    pub index: usize,
    pub path: PathBuf,
    /// Actual measured duration; the final segment is shorter than nominal.
    pub duration_secs: f64,
}

impl Segment {
    /// File name stem, e.g. `talk_16k_002`.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

/// Parse the trailing zero-padded index from a segment stem.
///
/// `talk_16k_002` → `Some(2)`. Returns `None` when the stem has no trailing
/// `_<digits>` part.
pub fn parse_segment_index(stem: &str) -> Option<usize> {
    let (_, index) = stem.rsplit_once('_')?;
    index.parse().ok()
}

/// WAV files directly inside `dir`, lexically sorted.
pub fn sorted_wavs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut wavs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();
    wavs.sort();
    Ok(wavs)
}

/// Splits one source recording into nominal-length segments.
pub struct Segmenter<'a, E: CommandExecutor> {
    executor: &'a E,
    nominal_secs: f64,
    quiet: bool,
}

impl<'a, E: CommandExecutor> Segmenter<'a, E> {
    pub fn new(executor: &'a E, nominal_secs: f64, quiet: bool) -> Self {
        Self {
            executor,
            nominal_secs,
            quiet,
        }
    }

    /// Split `source` into segments under `chunk_root/<source_id>/`.
    ///
    /// If the segment directory already contains any WAV file, splitting is
    /// skipped and the existing file set is trusted as complete. The check is
    /// deliberately coarse (any file, not the expected count): verifying the
    /// count would change resume behavior for trees produced by older runs.
    pub fn split(&self, source: &SourceRecording, chunk_root: &Path) -> Result<Vec<Segment>> {
        let segment_dir = chunk_root.join(&source.id);
        std::fs::create_dir_all(&segment_dir)?;

        if sorted_wavs(&segment_dir)?.is_empty() {
            self.run_split(source, &segment_dir)?;
        } else if !self.quiet {
            eprintln!("Segments already exist for {}, skipping split", source.id);
        }

        self.collect(source, &segment_dir)
    }

    fn run_split(&self, source: &SourceRecording, segment_dir: &Path) -> Result<()> {
        let input = source.path.to_string_lossy().to_string();
        let nominal = format_secs(self.nominal_secs);
        let pattern = segment_dir
            .join(format!(
                "{}_%0{}d.wav",
                source.id,
                defaults::SEGMENT_INDEX_WIDTH
            ))
            .to_string_lossy()
            .to_string();

        let args = [
            "-y",
            "-i",
            input.as_str(),
            "-f",
            "segment",
            "-segment_time",
            nominal.as_str(),
            "-c",
            "copy",
            pattern.as_str(),
        ];

        if !self.quiet {
            eprintln!(
                "Splitting {} into {}s segments...",
                source.id, nominal
            );
        }

        self.executor
            .execute(defaults::SPLIT_PROGRAM, &args)
            .map_err(|e| PipelineError::Segmentation {
                source: source.id.clone(),
                message: e.to_string(),
            })
    }

    /// Enumerate and probe the segment files in index order.
    fn collect(&self, source: &SourceRecording, segment_dir: &Path) -> Result<Vec<Segment>> {
        let wavs = sorted_wavs(segment_dir)?;
        let mut segments = Vec::with_capacity(wavs.len());

        for (index, path) in wavs.into_iter().enumerate() {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if let Some(parsed) = parse_segment_index(stem)
                && parsed != index
                && !self.quiet
            {
                eprintln!(
                    "Segment index gap in {}: {} at position {}",
                    source.id, stem, index
                );
            }
            let duration_secs = probe::wav_duration_secs(&path)?;
            segments.push(Segment {
                source_id: source.id.clone(),
                index,
                path,
                duration_secs,
            });
        }

        Ok(segments)
    }
}

/// Render a seconds value the way command lines expect it: integral values
/// without a fractional part (`30`, not `30.0`).
fn format_secs(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        format!("{}", secs)
    }
}
