//! Report formatting and printing utilities.
//!
//! Issues are displayed in cargo-style format. Kept apart from the pipeline
//! so the crate can be used as a library without terminal output.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::manifest::ManifestStats;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer. Issues are expected in report order.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let max_line_width = calculate_max_line_width(issues);

    for issue in issues {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(issues, writer);
}

/// Print the build result line.
pub fn print_build_success_to<W: Write>(stats: &ManifestStats, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Extracted {} {}, {} {} into {} chunk {} for {} {}",
            stats.routes,
            plural(stats.routes, "route", "routes"),
            stats.menus,
            plural(stats.menus, "menu", "menus"),
            stats.chunks,
            plural(stats.chunks, "file", "files"),
            stats.locales,
            plural(stats.locales, "locale", "locales"),
        )
        .green()
    );
}

pub fn print_build_success(stats: &ManifestStats) {
    print_build_success_to(stats, &mut io::stdout().lock());
}

/// Print a success message when a check finds no issues.
pub fn print_check_success_to<W: Write>(source_files: usize, locale_files: usize, writer: &mut W) {
    let msg = format!(
        "Checked {} source {}, {} locale {} - no issues found",
        source_files,
        plural(source_files, "file", "files"),
        locale_files,
        plural(locale_files, "file", "files"),
    );
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), msg.green());
}

pub fn print_check_success(source_files: usize, locale_files: usize) {
    print_check_success_to(source_files, locale_files, &mut io::stdout().lock());
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let severity = issue.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );

    match issue.location() {
        ReportLocation::Source(ctx) => {
            let (line, col) = (ctx.line(), ctx.col());
            let source_line = ctx.source_line.as_str();

            // Clickable location: --> path:line:col
            let _ = writeln!(
                writer,
                "{:>width$}{} {}:{}:{}",
                "",
                "-->".blue(),
                ctx.file_path(),
                line,
                col,
                width = max_line_width
            );

            let caret_char = match severity {
                Severity::Error => "^".red(),
                Severity::Warning => "^".yellow(),
            };

            let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
            let _ = writeln!(
                writer,
                "{:>width$} {} {}",
                line.to_string().blue(),
                "|".blue(),
                source_line,
                width = max_line_width
            );

            // Caret pointing to the column (col is 1-based)
            let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
            let caret_padding = UnicodeWidthStr::width(prefix.as_str());
            let _ = writeln!(
                writer,
                "{:>width$} {} {:>padding$}{}",
                "",
                "|".blue(),
                "",
                caret_char,
                width = max_line_width,
                padding = caret_padding
            );
        }
        ReportLocation::File { path } => {
            let _ = writeln!(
                writer,
                "{:>width$}{} {}",
                "",
                "-->".blue(),
                path,
                width = max_line_width
            );
        }
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "help:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer); // Empty line between issues
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} {} ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        plural(issues.len(), "problem", "problems"),
        total_errors,
        plural(total_errors, "error", "errors").red(),
        total_warnings,
        plural(total_warnings, "warning", "warnings").yellow()
    );
}

fn calculate_max_line_width(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line()),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}
