use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::{
    config::Config,
    core::{
        chunks::{Asset, ChunkOptions, build_chunks, manifest_asset},
        extract::{AccessorNames, ExtractorOptions, KeyExtractor, build_extractor},
        file_scanner::{ScanOptions, ScanResult, scan_project},
        manifest::{Manifest, ManifestBuilder, RouteKeys, route_pattern},
        parsers::json::{LoadLocalesResult, load_locale_files},
        resolve::ImportResolver,
        validate::validate_sources,
        walk::DependencyWalker,
    },
    issues::{Issue, LocaleParseIssue, sort_issues},
    utils::to_slash,
};

/// Everything one run needs: merged configuration, resolved directories and
/// the extraction strategy.
///
/// Owned by the caller and passed by reference into each pipeline step; no
/// step keeps state between runs.
pub struct RunContext {
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,
    pub root_dir: PathBuf,
    pub app_dir: PathBuf,
    pub messages_dir: PathBuf,
    pub output_dir: PathBuf,
    extractor: Box<dyn KeyExtractor>,
    resolver: ImportResolver,
    accessors: AccessorNames,
}

impl RunContext {
    pub fn new(root_dir: impl Into<PathBuf>, config: Config) -> Self {
        let root_dir = root_dir.into();
        let options = ExtractorOptions::from_config(&config);
        let accessors = options.accessors.clone();

        Self {
            app_dir: Config::resolve_path(&root_dir, &config.app_dir),
            messages_dir: Config::resolve_path(&root_dir, &config.messages_dir),
            output_dir: Config::resolve_path(&root_dir, &config.output_dir),
            extractor: build_extractor(config.extractor, options),
            resolver: ImportResolver::from_config(&root_dir, &config),
            accessors,
            root_dir,
            config,
        }
    }

    pub fn extractor(&self) -> &dyn KeyExtractor {
        self.extractor.as_ref()
    }

    pub fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    /// Entry and source files under the project root.
    pub fn scan(&self) -> ScanResult {
        let ignores = self.config.ignore_patterns();
        let result = scan_project(
            &self.root_dir,
            &ScanOptions {
                app_dir: &self.app_dir,
                entry_file_names: &self.config.entry_file_names,
                extensions: &self.config.extensions,
                ignores: &ignores,
            },
        );

        if result.skipped_count > 0 {
            tracing::warn!(
                "{} path(s) skipped due to access errors",
                result.skipped_count
            );
        }
        result
    }

    pub fn load_locales(&self) -> LoadLocalesResult {
        load_locale_files(&self.messages_dir)
    }

    /// Scan sources and load locales concurrently.
    pub fn scan_and_load(&self) -> (ScanResult, LoadLocalesResult) {
        rayon::join(|| self.scan(), || self.load_locales())
    }

    /// Usage issues for every source file, in report order.
    pub fn validate(&self, scan: &ScanResult) -> Vec<Issue> {
        validate_sources(
            &self.root_dir,
            &scan.sources,
            self.extractor(),
            &self.accessors,
        )
    }

    /// Walk every entry file and merge entries of the same route.
    pub fn walk_routes(&self, entries: &[PathBuf]) -> BTreeMap<String, RouteKeys> {
        let mut walker = DependencyWalker::new(self.extractor(), &self.resolver, self.config.max_depth);
        self.walk_entries(&mut walker, entries)
    }

    pub(crate) fn walk_entries(
        &self,
        walker: &mut DependencyWalker<'_>,
        entries: &[PathBuf],
    ) -> BTreeMap<String, RouteKeys> {
        let mut routes: BTreeMap<String, RouteKeys> = BTreeMap::new();

        for entry in entries {
            let Some(route) = route_pattern(&self.app_dir, entry) else {
                tracing::debug!("{} is not under the app directory", entry.display());
                continue;
            };

            let walked = walker.walk(entry);
            let acc = routes.entry(route).or_default();
            acc.keys.merge(&walked.keys);
            acc.entries.insert(self.display_path(entry));
            acc.files.extend(walked.files);
        }

        routes
    }

    pub fn build_manifest(&self, routes: &BTreeMap<String, RouteKeys>) -> Manifest {
        ManifestBuilder::new(
            &self.root_dir,
            &self.config.menus,
            &self.config.always_include_namespaces,
        )
        .build(routes)
    }

    pub fn chunk_options(&self) -> ChunkOptions<'_> {
        ChunkOptions {
            default_locale: &self.config.default_locale,
            always_include: &self.config.always_include_namespaces,
        }
    }

    /// Locale warnings as issues, with project-relative paths.
    pub fn locale_issues(&self, warnings: Vec<LocaleParseIssue>) -> impl Iterator<Item = Issue> + '_ {
        warnings.into_iter().map(|mut warning| {
            warning.file_path = self.display_path(Path::new(&warning.file_path));
            Issue::LocaleParse(warning)
        })
    }

    /// Project-relative, forward-slash path for output.
    pub fn display_path(&self, path: &Path) -> String {
        to_slash(path.strip_prefix(&self.root_dir).unwrap_or(path))
    }
}

/// Result of a full extraction run.
pub struct BuildOutput {
    pub manifest: Manifest,
    /// Chunk files followed by `manifest.json`.
    pub assets: Vec<Asset>,
    pub issues: Vec<Issue>,
    pub source_files: usize,
}

/// Scan, validate, load locales, walk, build the manifest and render every
/// output file. Nothing is written to disk here.
pub fn run_build(ctx: &RunContext, previous: Option<&Manifest>, now: DateTime<Utc>) -> Result<BuildOutput> {
    let (scan, locales) = ctx.scan_and_load();

    let mut issues = ctx.validate(&scan);
    issues.extend(ctx.locale_issues(locales.warnings));
    sort_issues(&mut issues);

    let routes = ctx.walk_routes(&scan.entries);
    let mut manifest = ctx.build_manifest(&routes);

    let mut assets = build_chunks(&mut manifest, &locales.locales, &ctx.chunk_options())?;
    manifest.stamp(previous, now);
    assets.push(manifest_asset(&manifest)?);

    Ok(BuildOutput {
        manifest,
        assets,
        issues,
        source_files: scan.sources.len(),
    })
}

/// Result of a validation-only run.
pub struct CheckOutput {
    pub issues: Vec<Issue>,
    pub source_files: usize,
    pub locales: usize,
}

/// Scan and validate sources and locale files without building anything.
pub fn run_check(ctx: &RunContext) -> CheckOutput {
    let (scan, locales) = ctx.scan_and_load();

    let mut issues = ctx.validate(&scan);
    issues.extend(ctx.locale_issues(locales.warnings));
    sort_issues(&mut issues);

    CheckOutput {
        issues,
        source_files: scan.sources.len(),
        locales: locales.locales.len(),
    }
}
