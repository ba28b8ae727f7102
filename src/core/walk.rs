//! Dependency walk from a route entry through everything it imports.
//!
//! The walk is an explicit breadth-first worklist over files. Each file is
//! read and extracted at most once per run: results live in a [`FileArena`]
//! keyed by absolute path and shared by every entry walked with the same
//! [`DependencyWalker`]. A per-walk visited set guarantees termination under
//! import cycles and `max_depth` bounds how far from the entry the walk goes.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fs,
    path::{Path, PathBuf},
};

use crate::core::{
    KeyMap,
    extract::KeyExtractor,
    resolve::{ImportResolver, normalize},
};

/// Per-file extraction result stored in the arena.
#[derive(Debug, Default)]
pub struct FileNode {
    pub path: PathBuf,
    pub keys: KeyMap,
    /// Resolved imports in source order.
    pub imports: Vec<PathBuf>,
    /// Why the file contributed nothing, if it could not be read or extracted.
    pub error: Option<String>,
}

/// Arena of extracted files, indexed by absolute path.
#[derive(Debug, Default)]
pub struct FileArena {
    nodes: Vec<FileNode>,
    index: HashMap<PathBuf, usize>,
}

impl FileArena {
    pub fn get(&self, path: &Path) -> Option<&FileNode> {
        self.index.get(path).map(|&id| &self.nodes[id])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: usize) -> &FileNode {
        &self.nodes[id]
    }

    fn insert(&mut self, node: FileNode) -> usize {
        let id = self.nodes.len();
        self.index.insert(node.path.clone(), id);
        self.nodes.push(node);
        id
    }
}

/// Keys reachable from one entry file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkResult {
    pub keys: KeyMap,
    /// Every file visited, sorted.
    pub files: Vec<PathBuf>,
}

pub struct DependencyWalker<'a> {
    extractor: &'a dyn KeyExtractor,
    resolver: &'a ImportResolver,
    max_depth: usize,
    arena: FileArena,
}

impl<'a> DependencyWalker<'a> {
    pub fn new(extractor: &'a dyn KeyExtractor, resolver: &'a ImportResolver, max_depth: usize) -> Self {
        Self {
            extractor,
            resolver,
            max_depth,
            arena: FileArena::default(),
        }
    }

    pub fn arena(&self) -> &FileArena {
        &self.arena
    }

    /// Union of the keys of `entry` and every file reachable through its
    /// imports within `max_depth` hops.
    pub fn walk(&mut self, entry: &Path) -> WalkResult {
        let mut result = WalkResult::default();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut worklist: VecDeque<(PathBuf, usize)> = VecDeque::new();

        let entry = normalize(entry);
        visited.insert(entry.clone());
        worklist.push_back((entry, 0));

        while let Some((path, depth)) = worklist.pop_front() {
            let id = self.load(&path);
            let node = self.arena.node(id);
            result.keys.merge(&node.keys);

            if depth >= self.max_depth {
                if !node.imports.is_empty() {
                    tracing::debug!(
                        "Depth limit {} reached at {}, not following {} imports",
                        self.max_depth,
                        path.display(),
                        node.imports.len()
                    );
                }
                continue;
            }

            for import in &node.imports {
                if visited.insert(import.clone()) {
                    worklist.push_back((import.clone(), depth + 1));
                }
            }
        }

        result.files = visited.into_iter().collect();
        result.files.sort();
        result
    }

    /// Arena id for `path`, extracting the file on first use.
    fn load(&mut self, path: &Path) -> usize {
        if let Some(&id) = self.arena.index.get(path) {
            return id;
        }
        let node = self.extract_file(path);
        self.arena.insert(node)
    }

    fn extract_file(&self, path: &Path) -> FileNode {
        let mut node = FileNode {
            path: path.to_path_buf(),
            ..Default::default()
        };

        let source = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("Skipping unreadable file {}: {}", path.display(), e);
                node.error = Some(e.to_string());
                return node;
            }
        };

        let file_name = path.to_string_lossy();
        let extraction = match self.extractor.extract(&source, &file_name) {
            Ok(x) => x,
            Err(e) => {
                tracing::debug!("Skipping {}: {:#}", path.display(), e);
                node.error = Some(format!("{:#}", e));
                return node;
            }
        };

        for specifier in &extraction.imports {
            match self.resolver.resolve(specifier, path) {
                Some(resolved) => node.imports.push(resolved),
                None => tracing::debug!(
                    "Unresolved import '{}' in {}",
                    specifier,
                    path.display()
                ),
            }
        }
        node.keys = extraction.keys;
        node
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::{TempDir, tempdir};

    use crate::core::extract::{ExtractorOptions, LexicalExtractor};
    use crate::core::walk::*;

    fn write(dir: &TempDir, rel: &str, content: &str) -> PathBuf {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn resolver(dir: &TempDir) -> ImportResolver {
        ImportResolver::new(
            dir.path(),
            vec![("@/".to_string(), "src/".to_string())],
            vec!["tsx".to_string(), "ts".to_string()],
        )
    }

    fn component(ns: &str, key: &str, imports: &[&str]) -> String {
        let mut source = String::new();
        for spec in imports {
            source.push_str(&format!("import X from \"{}\";\n", spec));
        }
        source.push_str(&format!(
            "export default function C() {{\n  const t = useTranslations(\"{}\");\n  return t(\"{}\");\n}}\n",
            ns, key
        ));
        source
    }

    #[test]
    fn test_walk_merges_imported_keys() {
        let dir = tempdir().unwrap();
        let entry = write(
            &dir,
            "src/app/page.tsx",
            &component("page", "title", &["./Header", "@/components/Footer", "react"]),
        );
        write(&dir, "src/app/Header.tsx", &component("header", "logo", &[]));
        write(
            &dir,
            "src/components/Footer/index.tsx",
            &component("footer", "copyright", &[]),
        );

        let extractor = LexicalExtractor::new(ExtractorOptions::default());
        let resolver = resolver(&dir);
        let mut walker = DependencyWalker::new(&extractor, &resolver, 10);
        let result = walker.walk(&entry);

        assert!(result.keys.contains("page", "title"));
        assert!(result.keys.contains("header", "logo"));
        assert!(result.keys.contains("footer", "copyright"));
        assert_eq!(result.files.len(), 3);
    }

    #[test]
    fn test_walk_terminates_on_cycle() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "src/a.tsx", &component("a", "one", &["./b"]));
        write(&dir, "src/b.tsx", &component("b", "two", &["./a"]));

        let extractor = LexicalExtractor::new(ExtractorOptions::default());
        let resolver = resolver(&dir);
        let mut walker = DependencyWalker::new(&extractor, &resolver, 10);
        let result = walker.walk(&a);

        let expected: KeyMap = [("a", "one"), ("b", "two")].into_iter().collect();
        assert_eq!(result.keys, expected);
        assert_eq!(walker.arena().len(), 2);
    }

    #[test]
    fn test_walk_respects_depth_limit() {
        let dir = tempdir().unwrap();
        let entry = write(&dir, "src/d0.tsx", &component("d0", "k", &["./d1"]));
        write(&dir, "src/d1.tsx", &component("d1", "k", &["./d2"]));
        write(&dir, "src/d2.tsx", &component("d2", "k", &[]));

        let extractor = LexicalExtractor::new(ExtractorOptions::default());
        let resolver = resolver(&dir);
        let mut walker = DependencyWalker::new(&extractor, &resolver, 1);
        let result = walker.walk(&entry);

        assert!(result.keys.contains("d0", "k"));
        assert!(result.keys.contains("d1", "k"));
        assert!(!result.keys.contains("d2", "k"));
    }

    #[test]
    fn test_import_order_does_not_change_result() {
        let dir = tempdir().unwrap();
        let first = write(&dir, "src/first.tsx", &component("p", "k", &["./x", "./y"]));
        let second = write(&dir, "src/second.tsx", &component("p", "k", &["./y", "./x"]));
        write(&dir, "src/x.tsx", &component("shared", "x", &["./y"]));
        write(&dir, "src/y.tsx", &component("shared", "y", &[]));

        let extractor = LexicalExtractor::new(ExtractorOptions::default());
        let resolver = resolver(&dir);
        let mut walker = DependencyWalker::new(&extractor, &resolver, 10);

        assert_eq!(walker.walk(&first).keys, walker.walk(&second).keys);
    }

    #[test]
    fn test_arena_is_shared_across_entries() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "src/a/page.tsx", &component("a", "k", &["@/shared"]));
        let b = write(&dir, "src/b/page.tsx", &component("b", "k", &["@/shared"]));
        write(&dir, "src/shared.tsx", &component("shared", "k", &[]));

        let extractor = LexicalExtractor::new(ExtractorOptions::default());
        let resolver = resolver(&dir);
        let mut walker = DependencyWalker::new(&extractor, &resolver, 10);
        walker.walk(&a);
        let result = walker.walk(&b);

        assert!(result.keys.contains("shared", "k"));
        assert_eq!(walker.arena().len(), 3);
    }

    #[test]
    fn test_missing_entry_yields_no_keys() {
        let dir = tempdir().unwrap();
        let extractor = LexicalExtractor::new(ExtractorOptions::default());
        let resolver = resolver(&dir);
        let mut walker = DependencyWalker::new(&extractor, &resolver, 10);

        let missing = dir.path().join("src/missing.tsx");
        let result = walker.walk(&missing);

        assert!(result.keys.is_empty());
        assert!(walker.arena().get(&missing).unwrap().error.is_some());
    }
}
