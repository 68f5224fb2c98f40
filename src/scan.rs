//! Directory scanning
//!
//! Collects the source files under a root into [`SourceInput`]s for the
//! pipeline. Only files with a recognized language are taken.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::ingest::{detect_language, SourceInput};

/// Progress callback: (current, total). May borrow from the caller's stack.
pub type ScanProgress<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// Files read from one directory scan.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Sorted by path
    pub inputs: Vec<SourceInput>,
    /// Recognized files dropped because they were not UTF-8
    pub skipped_non_utf8: usize,
    /// Recognized files that could not be read
    pub unreadable: usize,
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && SKIPPED_DIRS.contains(&name.as_ref())
}

/// Path relative to `root`, always with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scan `root` recursively for source files
///
/// # Guarantees
/// - Hidden entries, `target/` and `node_modules/` are skipped
/// - Inputs are sorted by relative path for determinism
/// - Non-UTF-8 and unreadable files are counted, not fatal
pub fn scan_directory(root: &Path, progress: Option<&ScanProgress<'_>>) -> Result<ScanResult> {
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }

    let mut paths = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped(e));
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = relative_path(root, entry.path());
        if detect_language(&rel, None).is_some() {
            paths.push((rel, entry.into_path()));
        }
    }
    paths.sort();

    let total = paths.len();
    let mut result = ScanResult::default();
    for (idx, (rel, path)) in paths.into_iter().enumerate() {
        if let Some(cb) = progress {
            cb(idx + 1, total);
        }
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(file = %rel, error = %e, "unreadable, skipped");
                result.unreadable += 1;
                continue;
            }
        };
        match String::from_utf8(bytes) {
            Ok(content) => result.inputs.push(SourceInput::new(rel, content)),
            Err(_) => {
                debug!(file = %rel, "not UTF-8, skipped");
                result.skipped_non_utf8 += 1;
            }
        }
    }
    Ok(result)
}
