//! Usage rules for translation accessors.
//!
//! Two independent rules run over every source file:
//! - a synchronous accessor constructed in a file that always renders on the
//!   server (by file-name convention) without a leading `"use client"`;
//! - an accessor constructed without a namespace.
//!
//! Each call returns its own issues. Nothing here is shared between files, so
//! the per-file pass runs in parallel.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use rayon::prelude::*;
use regex::Regex;

use crate::core::{
    SourceContext,
    extract::{
        AccessorNames, BindingOrigin, FileExtraction, KeyExtractor, NamespaceArg,
        lexical::mask_comments,
    },
};
use crate::issues::{ClientHookIssue, Issue, MissingNamespaceIssue, SourceParseIssue};
use crate::utils::{LineIndex, to_slash};

/// File stems the framework always renders as server components.
pub const SERVER_FILE_NAMES: &[&str] = &[
    "page",
    "layout",
    "template",
    "loading",
    "not-found",
    "default",
    "head",
];

/// Placeholder view shown while a route segment loads.
const LOADING_FILE_NAME: &str = "loading";

const CLIENT_DIRECTIVE: &str = "use client";

// One directive-prologue statement: a bare string literal, optional semicolon.
static DIRECTIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:"([^"\\\n]*)"|'([^'\\\n]*)')\s*;?"#).unwrap()
});

/// Whether the file's directive prologue contains `"use client"`.
pub fn has_client_directive(source: &str) -> bool {
    let masked = mask_comments(source);
    let mut rest = masked.as_str();

    while let Some(caps) = DIRECTIVE_REGEX.captures(rest) {
        let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
            break;
        };
        if value.as_str() == CLIENT_DIRECTIVE {
            return true;
        }
        rest = &rest[caps.get(0).map_or(0, |m| m.end())..];
    }

    false
}

/// Server-only file stem of `path`, if it has one.
fn server_file_stem(path: &Path) -> Option<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|stem| SERVER_FILE_NAMES.contains(stem))
}

/// Apply both rules to one already-extracted file.
///
/// `display_path` is what the issues report; `path` decides whether the
/// server-file rule applies.
pub fn validate_file(
    path: &Path,
    display_path: &str,
    source: &str,
    extraction: &FileExtraction,
    accessors: &AccessorNames,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    if extraction.accessors.is_empty() {
        return issues;
    }

    let index = LineIndex::new(source);
    let server_stem = server_file_stem(path);
    let server_only = server_stem.is_some() && !has_client_directive(source);

    for site in &extraction.accessors {
        let context = || SourceContext::at(display_path, source, &index, site.line, site.col);

        if server_only && site.origin == BindingOrigin::Sync {
            issues.push(Issue::ClientHook(ClientHookIssue {
                context: context(),
                accessor: site.accessor.clone(),
                async_alternative: accessors.asynchronous.first().cloned(),
                loading_view: server_stem == Some(LOADING_FILE_NAME),
            }));
        }

        if site.namespace == NamespaceArg::Missing {
            issues.push(Issue::MissingNamespace(MissingNamespaceIssue {
                context: context(),
                accessor: site.accessor.clone(),
            }));
        }
    }

    issues
}

/// Read, extract and validate every file in parallel.
///
/// Unreadable files are skipped; files the extractor rejects yield a
/// `source-parse-error` warning. The result is sorted into report order.
pub fn validate_sources(
    root: &Path,
    files: &[PathBuf],
    extractor: &dyn KeyExtractor,
    accessors: &AccessorNames,
) -> Vec<Issue> {
    let mut issues: Vec<Issue> = files
        .par_iter()
        .flat_map_iter(|path| {
            let display_path = to_slash(path.strip_prefix(root).unwrap_or(path));

            let source = match fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!("Skipping unreadable file {}: {}", display_path, e);
                    return Vec::new();
                }
            };

            match extractor.extract(&source, &display_path) {
                Ok(extraction) => validate_file(path, &display_path, &source, &extraction, accessors),
                Err(e) => vec![Issue::SourceParse(SourceParseIssue {
                    file_path: display_path,
                    error: format!("{:#}", e),
                })],
            }
        })
        .collect();

    crate::issues::sort_issues(&mut issues);
    issues
}
