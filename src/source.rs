//! Discovery of source recordings.

use crate::error::Result;
use crate::probe;
use std::path::{Path, PathBuf};

/// One source recording, immutable once discovered.
#[derive(Debug, Clone)]
pub struct SourceRecording {
    /// Identifier derived from the file name stem.
    pub id: String,
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Result of scanning the raw-audio directory.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Readable sources, sorted by file name.
    pub sources: Vec<SourceRecording>,
    /// Count of WAV files that could not be probed.
    pub unreadable: usize,
}

/// Scan `raw_dir` for WAV source recordings.
///
/// Files are returned sorted by name so batch order is stable across runs.
/// Unreadable files are counted and logged but do not fail discovery; a
/// missing directory does (it is the run-level fatal case).
pub fn discover_sources(raw_dir: &Path, quiet: bool) -> Result<Discovery> {
    let mut wavs: Vec<PathBuf> = std::fs::read_dir(raw_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();
    wavs.sort();

    let mut discovery = Discovery::default();
    for path in wavs {
        let id = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => {
                discovery.unreadable += 1;
                continue;
            }
        };
        match probe::wav_duration_secs(&path) {
            Ok(duration_secs) => discovery.sources.push(SourceRecording {
                id,
                path,
                duration_secs,
            }),
            Err(e) => {
                if !quiet {
                    eprintln!("Skipping unreadable source {}: {}", path.display(), e);
                }
                discovery.unreadable += 1;
            }
        }
    }

    Ok(discovery)
}
