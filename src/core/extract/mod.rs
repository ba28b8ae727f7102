//! Per-file extraction of translation accessor bindings, their keys and imports.
//!
//! Two interchangeable strategies implement [`KeyExtractor`]:
//! - [`LexicalExtractor`]: regex matching over comment-masked source text.
//! - [`AstExtractor`]: a full TSX parse with scope-aware binding tracking.
//!
//! Both honour the same contract: a key is recorded only when it is a
//! literal first argument of a call through an identifier bound to a known
//! namespace, and only under that identifier's namespace.

pub mod ast;
pub mod binding_context;
pub mod lexical;

pub use ast::AstExtractor;
pub use binding_context::BindingContext;
pub use lexical::LexicalExtractor;

use anyhow::Result;

use crate::config::{Config, ExtractorKind};
use crate::core::{KeyMap, resolve::ImportFilter};

/// Methods on an accessor that take a key as first argument, besides the call itself.
pub const KEY_METHODS: &[&str] = &["has", "raw", "rich", "markup"];

/// How an accessor was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    /// Render-time hook, needs a client runtime outside server components.
    Sync,
    /// Awaited server-side constructor.
    Async,
}

/// What was passed as the namespace to an accessor constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceArg {
    Literal(String),
    /// No arguments, or an options object without a `namespace` field.
    Missing,
    /// A non-literal expression; the namespace is unknowable.
    Dynamic,
}

/// One accessor constructor call site, bound or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorSite {
    /// Constructor name (e.g. `useTranslations`).
    pub accessor: String,
    pub namespace: NamespaceArg,
    pub origin: BindingOrigin,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
}

/// `localName` → namespace association created by a constructor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    pub local_name: String,
    pub namespace: String,
    pub origin: BindingOrigin,
}

/// Everything one file contributes to the walk and the validator.
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    pub bindings: Vec<NamespaceBinding>,
    pub accessors: Vec<AccessorSite>,
    pub keys: KeyMap,
    /// Followable import specifiers in source order, deduplicated.
    pub imports: Vec<String>,
}

impl FileExtraction {
    pub(crate) fn push_import(&mut self, specifier: &str, filter: &ImportFilter) {
        if filter.is_followable(specifier) && !self.imports.iter().any(|s| s == specifier) {
            self.imports.push(specifier.to_string());
        }
    }
}

/// Constructor names recognised as translation accessors.
#[derive(Debug, Clone)]
pub struct AccessorNames {
    pub sync: Vec<String>,
    pub asynchronous: Vec<String>,
}

impl Default for AccessorNames {
    fn default() -> Self {
        Self {
            sync: vec!["useTranslations".to_string()],
            asynchronous: vec!["getTranslations".to_string()],
        }
    }
}

impl AccessorNames {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sync: config.sync_accessors.clone(),
            asynchronous: config.async_accessors.clone(),
        }
    }

    pub fn origin_of(&self, name: &str) -> Option<BindingOrigin> {
        if self.sync.iter().any(|n| n == name) {
            Some(BindingOrigin::Sync)
        } else if self.asynchronous.iter().any(|n| n == name) {
            Some(BindingOrigin::Async)
        } else {
            None
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.sync
            .iter()
            .chain(self.asynchronous.iter())
            .map(String::as_str)
    }
}

/// Shared settings for both strategies.
#[derive(Debug, Clone, Default)]
pub struct ExtractorOptions {
    pub accessors: AccessorNames,
    pub import_filter: ImportFilter,
}

impl ExtractorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            accessors: AccessorNames::from_config(config),
            import_filter: ImportFilter::from_config(config),
        }
    }
}

/// Turns one file's text into bindings, keys and import specifiers.
pub trait KeyExtractor: Send + Sync {
    /// `file_name` is used for diagnostics and syntax selection only.
    fn extract(&self, source: &str, file_name: &str) -> Result<FileExtraction>;
}

/// Build the configured extraction strategy.
pub fn build_extractor(kind: ExtractorKind, options: ExtractorOptions) -> Box<dyn KeyExtractor> {
    match kind {
        ExtractorKind::Lexical => Box::new(LexicalExtractor::new(options)),
        ExtractorKind::Ast => Box::new(AstExtractor::new(options)),
    }
}
