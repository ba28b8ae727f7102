//! Per-locale chunk files and the sinks they are written to.
//!
//! A chunk holds only the leaves a route (or menu) references, nested the
//! same way as the locale file. A chunk that would be empty is not emitted:
//! loaders treat a missing file as "nothing to merge".

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::core::{KeyMap, manifest::Manifest, parsers::json::LocaleTrees};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Value at a dot path (`["common", "a", "b"]`) inside a tree.
pub fn get_path<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(tree, |node, segment| node.get(*segment))
}

/// Insert `value` at a dot path, creating intermediate objects.
///
/// An existing non-object node on the way is replaced.
pub fn set_path(tree: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut node = tree;
    for segment in parents {
        let child = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        let Value::Object(map) = child else {
            return;
        };
        node = map;
    }
    node.insert(last.to_string(), value);
}

/// Copy each `namespace.key` leaf of `keys` from `tree` (or from `fallback`
/// when `tree` lacks it) into a fresh object. Keys found in neither are skipped.
pub fn extract_subset(keys: &KeyMap, tree: &Value, fallback: Option<&Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for (namespace, ns_keys) in keys.iter() {
        for key in ns_keys {
            let full = format!("{}.{}", namespace, key);
            let path: Vec<&str> = full.split('.').collect();
            let value = get_path(tree, &path).or_else(|| fallback.and_then(|f| get_path(f, &path)));
            if let Some(value) = value {
                set_path(&mut out, &path, value.clone());
            }
        }
    }

    out
}

/// Copy whole namespaces (dot paths allowed) from `tree`, falling back per namespace.
fn copy_namespaces(out: &mut Map<String, Value>, namespaces: &[String], tree: &Value, fallback: Option<&Value>) {
    for namespace in namespaces {
        let path: Vec<&str> = namespace.split('.').collect();
        let value = get_path(tree, &path).or_else(|| fallback.and_then(|f| get_path(f, &path)));
        if let Some(value) = value {
            set_path(out, &path, value.clone());
        }
    }
}

/// One output file, named relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Settings the chunk writer needs beyond the manifest.
#[derive(Debug, Clone)]
pub struct ChunkOptions<'a> {
    pub default_locale: &'a str,
    pub always_include: &'a [String],
}

/// Build every non-empty `<chunk>.<locale>.json` and `<menuId>.<locale>.json`.
///
/// Also records `stats.chunks` and `stats.locales` on the manifest.
pub fn build_chunks(manifest: &mut Manifest, locales: &LocaleTrees, options: &ChunkOptions<'_>) -> Result<Vec<Asset>> {
    let mut assets = Vec::new();
    let fallback_tree = locales.get(options.default_locale);

    for (locale, tree) in locales {
        let fallback = if locale == options.default_locale {
            None
        } else {
            fallback_tree
        };

        for route in manifest.routes.values() {
            let mut chunk = extract_subset(&route.keys, tree, fallback);
            copy_namespaces(&mut chunk, options.always_include, tree, fallback);
            push_chunk(&mut assets, &route.chunk, locale, chunk)?;
        }

        for (menu_id, menu) in &manifest.menus {
            let chunk = extract_subset(&menu.keys, tree, fallback);
            push_chunk(&mut assets, menu_id, locale, chunk)?;
        }
    }

    manifest.stats.chunks = assets.len();
    manifest.stats.locales = locales.len();
    Ok(assets)
}

fn push_chunk(assets: &mut Vec<Asset>, stem: &str, locale: &str, chunk: Map<String, Value>) -> Result<()> {
    if chunk.is_empty() {
        return Ok(());
    }
    let name = format!("{}.{}.json", stem, locale);
    let bytes = serde_json::to_vec(&Value::Object(chunk))
        .with_context(|| format!("Failed to serialize chunk {}", name))?;
    assets.push(Asset { name, bytes });
    Ok(())
}

/// The pretty-printed manifest asset.
pub fn manifest_asset(manifest: &Manifest) -> Result<Asset> {
    let mut bytes = serde_json::to_vec_pretty(manifest).context("Failed to serialize manifest")?;
    bytes.push(b'\n');
    Ok(Asset {
        name: MANIFEST_FILE_NAME.to_string(),
        bytes,
    })
}

/// Previously written manifest, if there is a readable one.
pub fn read_manifest(output_dir: &Path) -> Option<Manifest> {
    let content = fs::read_to_string(output_dir.join(MANIFEST_FILE_NAME)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Destination for generated files.
pub trait AssetSink {
    fn emit(&mut self, asset: Asset) -> Result<()>;
}

impl AssetSink for Vec<Asset> {
    fn emit(&mut self, asset: Asset) -> Result<()> {
        self.push(asset);
        Ok(())
    }
}

/// Writes assets into a directory on disk.
pub struct FsSink {
    dir: PathBuf,
    written: usize,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        Ok(Self { dir, written: 0 })
    }

    /// Delete chunks listed in `previous` that this run no longer produces.
    ///
    /// Only `<stem>.<locale>.json` files whose stem is a route chunk or menu
    /// id of the previous manifest are candidates; anything else in the
    /// directory is left alone.
    pub fn remove_stale(&self, keep: &[Asset], previous: Option<&Manifest>) -> Result<usize> {
        let Some(previous) = previous else {
            return Ok(0);
        };
        let owned = previous.chunk_stems();
        let keep: BTreeSet<&str> = keep.iter().map(|a| a.name.as_str()).collect();
        let mut removed = 0;

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read output directory {:?}", self.dir))?;
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.is_file() && !keep.contains(name) && is_chunk_of(name, &owned) {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove stale chunk {:?}", path))?;
                tracing::debug!("Removed stale {}", name);
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Files actually rewritten (unchanged files are left untouched).
    pub fn written(&self) -> usize {
        self.written
    }
}

fn is_chunk_of(name: &str, stems: &BTreeSet<&str>) -> bool {
    name.strip_suffix(".json")
        .and_then(|rest| rest.rsplit_once('.'))
        .is_some_and(|(stem, _locale)| stems.contains(stem))
}

impl AssetSink for FsSink {
    fn emit(&mut self, asset: Asset) -> Result<()> {
        let path = self.dir.join(&asset.name);
        if fs::read(&path).is_ok_and(|existing| existing == asset.bytes) {
            return Ok(());
        }
        fs::write(&path, &asset.bytes).with_context(|| format!("Failed to write {:?}", path))?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::core::chunks::*;
    use crate::core::manifest::{ManifestStats, MenuSummary, RouteSummary};
    use crate::core::menu::PageType;

    fn keys(pairs: &[(&str, &str)]) -> KeyMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_set_and_get_path() {
        let mut tree = Map::new();
        set_path(&mut tree, &["a", "b", "c"], json!("x"));
        set_path(&mut tree, &["a", "d"], json!("y"));
        let tree = Value::Object(tree);

        assert_eq!(tree, json!({"a": {"b": {"c": "x"}, "d": "y"}}));
        assert_eq!(get_path(&tree, &["a", "b", "c"]), Some(&json!("x")));
        assert_eq!(get_path(&tree, &["a", "x"]), None);
        assert_eq!(get_path(&tree, &["a", "d", "deeper"]), None);
    }

    #[test]
    fn test_subset_is_minimal() {
        let tree = json!({"ns": {"a": {"b": "leaf", "sibling": "no"}, "other": "no"}});
        let subset = extract_subset(&keys(&[("ns", "a.b")]), &tree, None);
        assert_eq!(Value::Object(subset), json!({"ns": {"a": {"b": "leaf"}}}));
    }

    #[test]
    fn test_subset_copies_rich_subtree_and_falls_back() {
        let en = json!({"ns": {"items": {"one": "One", "two": "Two"}, "title": "Title"}});
        let de = json!({"ns": {"items": {"one": "Eins"}}});
        let subset = extract_subset(&keys(&[("ns", "items"), ("ns", "title"), ("ns", "gone")]), &de, Some(&en));
        assert_eq!(
            Value::Object(subset),
            json!({"ns": {"items": {"one": "Eins"}, "title": "Title"}})
        );
    }

    #[test]
    fn test_dotted_namespace() {
        let tree = json!({"admin": {"users": {"title": "Users"}}});
        let subset = extract_subset(&keys(&[("admin.users", "title")]), &tree, None);
        assert_eq!(Value::Object(subset), json!({"admin": {"users": {"title": "Users"}}}));
    }

    fn manifest() -> Manifest {
        let route = |chunk: &str, k: KeyMap| RouteSummary {
            chunk: chunk.to_string(),
            page_type: PageType::Admin,
            menu_id: Some("menu-admin".to_string()),
            entries: vec![],
            namespaces: k.namespaces().map(str::to_string).collect(),
            keys: k,
        };
        Manifest {
            routes: BTreeMap::from([
                ("/admin".to_string(), route("admin", keys(&[("dash", "title")]))),
                ("/admin/empty".to_string(), route("admin-empty", keys(&[("none", "x")]))),
            ]),
            menus: BTreeMap::from([(
                "menu-admin".to_string(),
                MenuSummary {
                    namespace: "menu_admin".to_string(),
                    source: "menu.ts".to_string(),
                    keys: keys(&[("menu_admin", "dash.title")]),
                    routes: vec!["/admin".to_string(), "/admin/empty".to_string()],
                },
            )]),
            stats: ManifestStats::default(),
            generated: String::new(),
        }
    }

    #[test]
    fn test_build_chunks_skips_empty() {
        let locales = BTreeMap::from([
            (
                "en".to_string(),
                json!({"dash": {"title": "Dashboard"}, "menu_admin": {"dash": {"title": "Dash"}}, "common": {"ok": "OK"}}),
            ),
            ("fr".to_string(), json!({"dash": {"title": "Tableau"}})),
        ]);
        let mut manifest = manifest();
        let always = vec!["common".to_string()];
        let assets = build_chunks(
            &mut manifest,
            &locales,
            &ChunkOptions {
                default_locale: "en",
                always_include: &always,
            },
        )
        .unwrap();

        let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "admin.en.json",
                "admin-empty.en.json",
                "menu-admin.en.json",
                "admin.fr.json",
                "admin-empty.fr.json",
                "menu-admin.fr.json",
            ]
        );
        assert_eq!(
            String::from_utf8(assets[3].bytes.clone()).unwrap(),
            r#"{"dash":{"title":"Tableau"},"common":{"ok":"OK"}}"#
        );
        assert_eq!(manifest.stats.chunks, 6);
        assert_eq!(manifest.stats.locales, 2);
    }

    #[test]
    fn test_fs_sink_removes_stale_and_skips_unchanged() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("admin-empty.en.json"), "{}").unwrap();
        fs::write(dir.path().join("menu-admin.de.json"), "{}").unwrap();
        fs::write(dir.path().join("data.json"), "{}").unwrap();
        fs::write(dir.path().join("site.en.json"), "{}").unwrap();
        fs::write(dir.path().join("README.md"), "keep").unwrap();

        let assets = vec![Asset {
            name: "admin.en.json".to_string(),
            bytes: b"{}".to_vec(),
        }];

        let mut sink = FsSink::new(dir.path()).unwrap();
        assert_eq!(sink.remove_stale(&assets, Some(&manifest())).unwrap(), 2);
        for asset in assets.clone() {
            sink.emit(asset).unwrap();
        }
        for asset in assets {
            sink.emit(asset).unwrap();
        }

        assert_eq!(sink.written(), 1);
        assert!(dir.path().join("admin.en.json").exists());
        assert!(!dir.path().join("admin-empty.en.json").exists());
        assert!(!dir.path().join("menu-admin.de.json").exists());
        assert!(dir.path().join("data.json").exists());
        assert!(dir.path().join("site.en.json").exists());
        assert!(dir.path().join("README.md").exists());
    }

    #[test]
    fn test_remove_stale_without_previous_manifest_keeps_everything() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.json"), "{}").unwrap();

        let sink = FsSink::new(dir.path()).unwrap();
        assert_eq!(sink.remove_stale(&[], None).unwrap(), 0);
        assert!(dir.path().join("data.json").exists());
    }
}
