use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::config::{BUILD_OUTPUT_DIRS, PRUNED_DIRS};
use crate::utils::to_slash;

/// Result of scanning a project tree.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Route entry files (`page.*`, `layout.*`) under the app directory, sorted.
    pub entries: Vec<PathBuf>,
    /// Every source file under the root, sorted.
    pub sources: Vec<PathBuf>,
    /// Paths that could not be read while walking.
    pub skipped_count: usize,
}

/// What counts as a source file and as a route entry.
#[derive(Debug, Clone)]
pub struct ScanOptions<'a> {
    pub app_dir: &'a Path,
    pub entry_file_names: &'a [String],
    pub extensions: &'a [String],
    pub ignores: &'a [Pattern],
}

/// Walk `root` depth-first in file-name order, pruning dependency and build
/// directories, and classify source files.
pub fn scan_project(root: &Path, options: &ScanOptions<'_>) -> ScanResult {
    let mut result = ScanResult::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, root, options.ignores));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                result.skipped_count += 1;
                tracing::debug!("Cannot access path: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !has_extension(path, options.extensions) {
            continue;
        }

        if path.starts_with(options.app_dir) && is_entry_file(path, options.entry_file_names) {
            result.entries.push(path.to_path_buf());
        }
        result.sources.push(path.to_path_buf());
    }

    result
}

fn is_pruned(entry: &DirEntry, root: &Path, ignores: &[Pattern]) -> bool {
    if entry.depth() > 0 && entry.file_type().is_dir() {
        let name = entry.file_name().to_str().unwrap_or_default();
        if PRUNED_DIRS.contains(&name)
            || (entry.depth() == 1 && BUILD_OUTPUT_DIRS.contains(&name))
        {
            return true;
        }
    }

    if ignores.is_empty() {
        return false;
    }
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let relative = to_slash(relative);
    ignores.iter().any(|p| p.matches(&relative))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x == ext))
}

/// `page.tsx`, `layout.js`, ... but not `page.test.tsx`.
pub fn is_entry_file(path: &Path, entry_file_names: &[String]) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| entry_file_names.iter().any(|n| n == stem))
}
