//! Deterministic resolution of per-segment tool output paths.
//!
//! External tools do not guarantee a stable output layout: the result may sit
//! directly under a model-named directory, under one extra per-invocation
//! subdirectory, or flattened. Resolution tries a fixed candidate order and
//! the first match wins; wildcard levels are scanned in lexical order so the
//! outcome never depends on directory-enumeration order.

use std::path::{Path, PathBuf};

/// Resolve the expected result file for one segment under `out_root`.
///
/// Candidate order:
/// 1. `out_root/<model>/<segment_stem>/<result_file>`
/// 2. first `out_root/<model>/*/<segment_stem>/<result_file>`
/// 3. first `out_root/<model>/*/<result_file>`
///
/// Returns `None` when no candidate exists. Callers treat that as "needs
/// processing", never as an error.
pub fn locate(out_root: &Path, model: &str, segment_stem: &str, result_file: &str) -> Option<PathBuf> {
    let model_dir = out_root.join(model);

    let primary = model_dir.join(segment_stem).join(result_file);
    if primary.is_file() {
        return Some(primary);
    }

    let subdirs = sorted_subdirs(&model_dir);

    for dir in &subdirs {
        let nested = dir.join(segment_stem).join(result_file);
        if nested.is_file() {
            return Some(nested);
        }
    }

    for dir in &subdirs {
        let flat = dir.join(result_file);
        if flat.is_file() {
            return Some(flat);
        }
    }

    None
}

/// Immediate subdirectories of `dir`, lexically sorted. Missing or unreadable
/// directories yield an empty list.
fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}
