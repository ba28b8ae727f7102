//! Import specifier filtering and resolution to files on disk.

use std::path::{Component, Path, PathBuf};

use crate::config::Config;

/// Decides which import specifiers are part of the project's own graph.
///
/// Relative specifiers and aliased specifiers are followed; bare package
/// imports are not, and neither is anything under a reserved segment (the
/// i18n runtime's own helpers).
#[derive(Debug, Clone, Default)]
pub struct ImportFilter {
    alias_prefixes: Vec<String>,
    reserved_segments: Vec<String>,
}

impl ImportFilter {
    pub fn new(alias_prefixes: Vec<String>, reserved_segments: Vec<String>) -> Self {
        Self {
            alias_prefixes,
            reserved_segments,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.aliases.keys().cloned().collect(),
            config.reserved_segments.clone(),
        )
    }

    pub fn is_followable(&self, specifier: &str) -> bool {
        let local = is_relative(specifier)
            || self
                .alias_prefixes
                .iter()
                .any(|prefix| specifier.starts_with(prefix.as_str()));
        if !local {
            return false;
        }
        !specifier
            .split('/')
            .any(|segment| self.reserved_segments.iter().any(|r| r == segment))
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Maps a module specifier to a concrete source file.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    root: PathBuf,
    /// `(prefix, project-relative target)`, longest prefix first.
    aliases: Vec<(String, String)>,
    extensions: Vec<String>,
}

impl ImportResolver {
    pub fn new(root: impl Into<PathBuf>, aliases: Vec<(String, String)>, extensions: Vec<String>) -> Self {
        let mut aliases = aliases;
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self {
            root: root.into(),
            aliases,
            extensions,
        }
    }

    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(
            root,
            config
                .aliases
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            config.extensions.clone(),
        )
    }

    /// Resolve `specifier` as imported from `from_file`.
    ///
    /// Tries `<path>.<ext>` for each extension in order, then
    /// `<path>/index.<ext>`. `None` means "do not follow this edge".
    pub fn resolve(&self, specifier: &str, from_file: &Path) -> Option<PathBuf> {
        let base = self.base_path(specifier, from_file)?;

        for ext in &self.extensions {
            let candidate = append_extension(&base, ext);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        // A specifier that already names a file with its extension.
        if base.is_file()
            && base
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| self.extensions.iter().any(|x| x == e))
        {
            return Some(base);
        }

        for ext in &self.extensions {
            let candidate = base.join(format!("index.{}", ext));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        None
    }

    fn base_path(&self, specifier: &str, from_file: &Path) -> Option<PathBuf> {
        for (prefix, target) in &self.aliases {
            if let Some(rest) = specifier.strip_prefix(prefix.as_str()) {
                let target = target.strip_prefix("./").unwrap_or(target);
                return Some(normalize(&self.root.join(target).join(rest)));
            }
        }

        if is_relative(specifier) {
            let base_dir = from_file.parent()?;
            return Some(normalize(&base_dir.join(specifier)));
        }

        None
    }
}

/// `foo/bar` + `tsx` → `foo/bar.tsx`, keeping names like `bar.server` intact.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Lexically collapse `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
