//! Aggregation of per-route walk results into the manifest.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Component, Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MenuConfig;
use crate::core::{
    KeyMap,
    menu::{PageType, classify_route, load_menu_keys},
};
use crate::utils::route_slug;

/// Route pattern for an entry file: its directory relative to `app_dir`,
/// without route groups, parallel-route slots and a leading `[locale]`.
///
/// Returns `None` for files outside `app_dir`.
pub fn route_pattern(app_dir: &Path, entry: &Path) -> Option<String> {
    let dir = entry.parent()?.strip_prefix(app_dir).ok()?;

    let mut segments: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str().map(str::to_string),
            _ => None,
        })
        .filter(|s| !(s.starts_with('(') && s.ends_with(')')) && !s.starts_with('@'))
        .collect();

    if segments.first().is_some_and(|s| s == "[locale]") {
        segments.remove(0);
    }

    Some(format!("/{}", segments.join("/")))
}

/// Keys reachable from every entry file of one route.
#[derive(Debug, Default, Clone)]
pub struct RouteKeys {
    pub keys: KeyMap,
    /// Entry files merged into this route, project-relative.
    pub entries: BTreeSet<String>,
    /// Every file visited by the walks.
    pub files: BTreeSet<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    /// Chunk file stem (`<chunk>.<locale>.json`).
    pub chunk: String,
    pub page_type: PageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_id: Option<String>,
    pub entries: Vec<String>,
    pub namespaces: Vec<String>,
    /// Route-owned keys; menu keys are not repeated here.
    pub keys: KeyMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSummary {
    pub namespace: String,
    /// Menu definition file, project-relative.
    pub source: String,
    pub keys: KeyMap,
    /// Routes sharing this menu.
    pub routes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStats {
    pub routes: usize,
    pub menus: usize,
    pub locales: usize,
    pub files: usize,
    pub keys: usize,
    pub chunks: usize,
    pub page_types: BTreeMap<PageType, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub routes: BTreeMap<String, RouteSummary>,
    pub menus: BTreeMap<String, MenuSummary>,
    pub stats: ManifestStats,
    pub generated: String,
}

impl Manifest {
    /// File stems of every route and menu chunk described here.
    pub fn chunk_stems(&self) -> BTreeSet<&str> {
        self.routes
            .values()
            .map(|route| route.chunk.as_str())
            .chain(self.menus.keys().map(String::as_str))
            .collect()
    }

    /// Set `generated`, keeping `previous`'s timestamp when nothing else changed.
    pub fn stamp(&mut self, previous: Option<&Manifest>, now: DateTime<Utc>) {
        if let Some(previous) = previous {
            self.generated = previous.generated.clone();
            if self == previous {
                return;
            }
        }
        self.generated = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
}

/// Builds the manifest from walked routes, reading each menu file once.
pub struct ManifestBuilder<'a> {
    root: &'a Path,
    menus: &'a MenuConfig,
    always_include: &'a [String],
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(root: &'a Path, menus: &'a MenuConfig, always_include: &'a [String]) -> Self {
        Self {
            root,
            menus,
            always_include,
        }
    }

    /// `generated` is left empty and `stats.chunks`/`stats.locales` at zero;
    /// the chunk writer fills them in.
    pub fn build(&self, routes: &BTreeMap<String, RouteKeys>) -> Manifest {
        let mut menus: BTreeMap<String, MenuSummary> = BTreeMap::new();
        let mut summaries = BTreeMap::new();
        let mut stats = ManifestStats::default();
        let mut files: BTreeSet<&PathBuf> = BTreeSet::new();

        for (route, walked) in routes {
            let (page_type, menu_ref) = classify_route(route, self.menus);
            *stats.page_types.entry(page_type).or_default() += 1;
            files.extend(walked.files.iter());

            let mut keys = walked.keys.clone();

            let menu_id = menu_ref.map(|menu_ref| {
                let menu = menus
                    .entry(menu_ref.menu_id.clone())
                    .or_insert_with(|| MenuSummary {
                        keys: load_menu_keys(self.root, &menu_ref),
                        namespace: menu_ref.namespace.clone(),
                        source: menu_ref.source.clone(),
                        routes: Vec::new(),
                    });
                menu.routes.push(route.clone());
                keys.subtract(&menu.keys);
                menu_ref.menu_id
            });

            let namespaces: BTreeSet<String> = keys
                .namespaces()
                .map(str::to_string)
                .chain(self.always_include.iter().cloned())
                .collect();

            tracing::debug!(
                "{} [{}] {} keys in {} namespaces",
                route,
                page_type,
                keys.len(),
                namespaces.len()
            );

            summaries.insert(
                route.clone(),
                RouteSummary {
                    chunk: route_slug(route),
                    page_type,
                    menu_id,
                    entries: walked.entries.iter().cloned().collect(),
                    namespaces: namespaces.into_iter().collect(),
                    keys,
                },
            );
        }

        // Menus without keys produce no chunk and are left out.
        menus.retain(|_, menu| !menu.keys.is_empty());
        for summary in summaries.values_mut() {
            if summary
                .menu_id
                .as_ref()
                .is_some_and(|id| !menus.contains_key(id))
            {
                summary.menu_id = None;
            }
        }

        stats.routes = summaries.len();
        stats.menus = menus.len();
        stats.files = files.len();
        stats.keys = summaries.values().map(|r| r.keys.len()).sum::<usize>()
            + menus.values().map(|m| m.keys.len()).sum::<usize>();

        Manifest {
            routes: summaries,
            menus,
            stats,
            generated: String::new(),
        }
    }
}
