//! Issue types produced while extracting and validating translation usage.
//!
//! Issues are advisory: none of them stops extraction. Only the presence of
//! an error-severity issue changes the process exit code.

use enum_dispatch::enum_dispatch;

use crate::core::SourceContext;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    ClientHookInServerComponent,
    MissingNamespace,
    LocaleParseError,
    SourceParseError,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::ClientHookInServerComponent => write!(f, "client-hook-in-server-component"),
            Rule::MissingNamespace => write!(f, "missing-namespace"),
            Rule::LocaleParseError => write!(f, "locale-parse-error"),
            Rule::SourceParseError => write!(f, "source-parse-error"),
        }
    }
}

// ============================================================
// Issue Types - Source Code (SourceContext)
// ============================================================

/// A synchronous accessor constructed in a file that renders on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHookIssue {
    pub context: SourceContext,
    /// The accessor constructor that was called (e.g. `useTranslations`).
    pub accessor: String,
    /// Suggested async replacement, if one is configured.
    pub async_alternative: Option<String>,
    /// The file is a loading placeholder view.
    pub loading_view: bool,
}

impl ClientHookIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::ClientHookInServerComponent
    }
}

/// An accessor constructed without a namespace argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingNamespaceIssue {
    pub context: SourceContext,
    pub accessor: String,
}

impl MissingNamespaceIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::MissingNamespace
    }
}

// ============================================================
// Issue Types - Whole Files
// ============================================================

/// A locale file that is not valid JSON (or not an object); the locale is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleParseIssue {
    pub file_path: String,
    pub error: String,
}

impl LocaleParseIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::LocaleParseError
    }
}

/// A source file the extractor could not read or parse; it contributes no keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceParseIssue {
    pub file_path: String,
    pub error: String,
}

impl SourceParseIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::SourceParseError
    }
}

// ============================================================
// Issue Enum
// ============================================================

/// A usage problem found during a run.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    ClientHook(ClientHookIssue),
    MissingNamespace(MissingNamespaceIssue),
    LocaleParse(LocaleParseIssue),
    SourceParse(SourceParseIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn rule(&self) -> Rule {
        self.report_rule()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// Stable ordering: file, line, column, then rule.
    pub fn sort_key(&self) -> (String, usize, usize, Rule) {
        let (file, line, col) = match self.location() {
            ReportLocation::Source(ctx) => (ctx.file_path().to_string(), ctx.line(), ctx.col()),
            ReportLocation::File { path } => (path.to_string(), 0, 0),
        };
        (file, line, col, self.rule())
    }
}

/// Sort issues into report order in place.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by_cached_key(Issue::sort_key);
}

/// Number of error-severity issues.
pub fn count_errors(issues: &[Issue]) -> usize {
    issues.iter().filter(|i| i.is_error()).count()
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Source code location (has source_line for context display).
    Source(&'a SourceContext),
    /// File-level only (no line context).
    File { path: &'a str },
}

/// Trait for types that can be reported to CLI.
///
/// Uses `enum_dispatch` for zero-cost dispatch on the `Issue` enum.
#[enum_dispatch]
pub trait Report {
    /// Get the location for this issue.
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    /// Severity level.
    fn report_severity(&self) -> Severity;

    /// Rule identifier.
    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for ClientHookIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        if self.loading_view {
            format!(
                "{}() in a loading view, which renders on the server",
                self.accessor
            )
        } else {
            format!(
                "{}() requires a client component but this file renders on the server",
                self.accessor
            )
        }
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        if self.loading_view {
            return Some(
                "loading views should render skeleton placeholders instead of translated text"
                    .to_string(),
            );
        }
        match &self.async_alternative {
            Some(alt) => Some(format!(
                "use `await {}(...)` or add \"use client\" at the top of the file",
                alt
            )),
            None => Some("add \"use client\" at the top of the file".to_string()),
        }
    }
}

impl Report for MissingNamespaceIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        format!("{}() called without a namespace", self.accessor)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some(format!(
            "pass the namespace explicitly, e.g. {}(\"common\"); keys of this accessor are not extracted",
            self.accessor
        ))
    }
}

impl Report for LocaleParseIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some("this locale is skipped; no chunks are written for it".to_string())
    }
}

impl Report for SourceParseIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}
