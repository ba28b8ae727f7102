//! Incremental build-tool integration.
//!
//! The host build tool is abstracted behind [`BuildHooks`]: the plugin taps a
//! "modules finished" phase to walk the entry modules that were compiled and
//! a "process assets" phase to emit chunks into the host's virtual output.
//! Both phases may run many times across rebuilds; the plugin state is the
//! only thing carried between them.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    config::{Config, load_config},
    core::{
        RunContext,
        chunks::{Asset, AssetSink, build_chunks, manifest_asset},
        file_scanner::is_entry_file,
        manifest::{Manifest, RouteKeys, route_pattern},
        resolve::normalize,
        walk::{DependencyWalker, WalkResult},
    },
    issues::Report,
};

pub const PLUGIN_NAME: &str = "IntlChunksPlugin";

/// Options accepted by the plugin; anything unset comes from the project
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    pub messages_dir: Option<String>,
    pub output_dir: Option<String>,
    #[serde(default)]
    pub debug: bool,
    pub default_locale: Option<String>,
    pub always_include_namespaces: Option<Vec<String>>,
}

impl PluginOptions {
    fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.messages_dir {
            config.messages_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(locale) = &self.default_locale {
            config.default_locale = locale.clone();
        }
        if let Some(namespaces) = &self.always_include_namespaces {
            config.always_include_namespaces = namespaces.clone();
        }
    }
}

/// A module the host finished compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Absolute path of the module's source file.
    pub resource: PathBuf,
}

impl ModuleRecord {
    pub fn new(resource: impl Into<PathBuf>) -> Self {
        Self {
            resource: resource.into(),
        }
    }
}

/// Modules reported by one "modules finished" phase.
#[derive(Debug, Clone, Default)]
pub struct ModuleBatch {
    pub modules: Vec<ModuleRecord>,
    /// The host started over; previously accumulated routes are dropped.
    pub full_rebuild: bool,
}

pub type FinishModulesHook = Box<dyn FnMut(&ModuleBatch) -> Result<()> + Send>;
pub type ProcessAssetsHook = Box<dyn FnMut(&mut dyn AssetSink) -> Result<()> + Send>;

/// The host build tool's lifecycle, as seen by the plugin.
pub trait BuildHooks {
    fn tap_finish_modules(&mut self, name: &str, hook: FinishModulesHook);
    fn tap_process_assets(&mut self, name: &str, hook: ProcessAssetsHook);
}

#[derive(Default)]
struct PluginState {
    /// Walk result per entry module, with its route.
    entries: BTreeMap<PathBuf, (String, WalkResult)>,
    /// Modules handled in the current pass.
    processed: HashSet<PathBuf>,
    previous: Option<Manifest>,
}

pub struct IncrementalPlugin {
    ctx: Arc<RunContext>,
    debug: bool,
    state: Arc<Mutex<PluginState>>,
}

impl IncrementalPlugin {
    /// Plugin for the project in the current directory.
    pub fn new(options: PluginOptions) -> Result<Self> {
        let root = std::env::current_dir()?;
        Self::with_root(root, options)
    }

    pub fn with_root(root: impl Into<PathBuf>, options: PluginOptions) -> Result<Self> {
        let root = root.into();
        let mut config = load_config(&root)?.config;
        options.apply_to(&mut config);
        config.validate()?;

        Ok(Self {
            ctx: Arc::new(RunContext::new(root, config)),
            debug: options.debug,
            state: Arc::new(Mutex::new(PluginState::default())),
        })
    }

    /// Attach to the host's two lifecycle phases.
    pub fn apply(&self, hooks: &mut impl BuildHooks) {
        let ctx = Arc::clone(&self.ctx);
        let state = Arc::clone(&self.state);
        let debug = self.debug;
        hooks.tap_finish_modules(
            PLUGIN_NAME,
            Box::new(move |batch: &ModuleBatch| {
                let mut state = lock(&state)?;
                finish_modules(&ctx, &mut state, batch, debug);
                Ok(())
            }),
        );

        let ctx = Arc::clone(&self.ctx);
        let state = Arc::clone(&self.state);
        hooks.tap_process_assets(
            PLUGIN_NAME,
            Box::new(move |sink: &mut dyn AssetSink| {
                let mut state = lock(&state)?;
                process_assets(&ctx, &mut state, sink)
            }),
        );
    }
}

fn lock(state: &Mutex<PluginState>) -> Result<std::sync::MutexGuard<'_, PluginState>> {
    state
        .lock()
        .map_err(|_| anyhow!("{} state is poisoned by an earlier panic", PLUGIN_NAME))
}

fn is_route_entry(ctx: &RunContext, path: &Path) -> bool {
    path.starts_with(&ctx.app_dir)
        && is_entry_file(path, &ctx.config.entry_file_names)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ctx.config.extensions.iter().any(|x| x == ext))
}

fn finish_modules(ctx: &RunContext, state: &mut PluginState, batch: &ModuleBatch, debug: bool) {
    if batch.full_rebuild {
        state.entries.clear();
    }
    state.processed.clear();

    // Entries to walk this pass: recompiled entries, plus every cached entry
    // that reached a recompiled non-entry module.
    let mut dirty: BTreeMap<PathBuf, String> = BTreeMap::new();
    for module in &batch.modules {
        let path = normalize(&module.resource);
        if !state.processed.insert(path.clone()) {
            continue;
        }

        if is_route_entry(ctx, &path) {
            if let Some(route) = route_pattern(&ctx.app_dir, &path) {
                dirty.insert(path, route);
            }
            continue;
        }

        for (entry, (route, walked)) in &state.entries {
            if walked.files.binary_search(&path).is_ok() {
                dirty.insert(entry.clone(), route.clone());
            }
        }
    }

    // Files may have changed since the last pass; the arena lives for one pass.
    let mut walker = DependencyWalker::new(ctx.extractor(), ctx.resolver(), ctx.config.max_depth);

    for (path, route) in dirty {
        let walked = walker.walk(&path);
        if debug {
            tracing::info!(
                "[{}] {} -> {} ({} keys)",
                PLUGIN_NAME,
                ctx.display_path(&path),
                route,
                walked.keys.len()
            );
        }
        state.entries.insert(path, (route, walked));
    }
}

fn process_assets(ctx: &RunContext, state: &mut PluginState, sink: &mut dyn AssetSink) -> Result<()> {
    let locales = ctx.load_locales();
    for issue in ctx.locale_issues(locales.warnings) {
        tracing::warn!("[{}] {}", PLUGIN_NAME, issue.message());
    }

    let mut routes: BTreeMap<String, RouteKeys> = BTreeMap::new();
    for (entry, (route, walked)) in &state.entries {
        let acc = routes.entry(route.clone()).or_default();
        acc.keys.merge(&walked.keys);
        acc.entries.insert(ctx.display_path(entry));
        acc.files.extend(walked.files.iter().cloned());
    }

    let mut manifest = ctx.build_manifest(&routes);
    let mut assets = build_chunks(&mut manifest, &locales.locales, &ctx.chunk_options())?;
    manifest.stamp(state.previous.as_ref(), Utc::now());
    assets.push(manifest_asset(&manifest)?);

    let prefix = ctx.config.output_dir.trim_end_matches('/');
    for asset in assets {
        sink.emit(Asset {
            name: format!("{}/{}", prefix, asset.name),
            bytes: asset.bytes,
        })?;
    }

    state.previous = Some(manifest);
    Ok(())
}
