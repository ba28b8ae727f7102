//! Regex-based extraction over comment-masked source text.
//!
//! This strategy never builds a syntax tree. Comments are blanked out first
//! (keeping byte offsets and line breaks intact) so commented-out calls are
//! not picked up; string contents are left alone.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use super::{
    AccessorSite, BindingOrigin, ExtractorOptions, FileExtraction, KeyExtractor, NamespaceArg,
    NamespaceBinding,
};
use crate::utils::LineIndex;

// `const t = ` / `let t: Translator = await ` immediately before a constructor call.
static BINDING_TAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w$])(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=;]*)?=\s*(?:await\s+)?$")
        .unwrap()
});

// `ident("key"` / `ident.rich('key'` followed by `,` or `)`; the key must be the whole argument.
static KEY_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:^|[^\w$.])([A-Za-z_$][\w$]*)(?:\s*\.\s*(has|raw|rich|markup))?\s*\(\s*(?:"([^"\\\n]*)"|'([^'\\\n]*)'|`([^`$\\]*)`)\s*[,)]"#,
    )
    .unwrap()
});

static IMPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:import|export)\b[^;'"`]*?\bfrom\s*["']([^"'\n]+)["']|\bimport\s*["']([^"'\n]+)["']|\bimport\s*\(\s*["']([^"'\n]+)["']\s*\)"#,
    )
    .unwrap()
});

static LEADING_STRING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"([^"\\]*)"|'([^'\\]*)'|`([^`$\\]*)`)"#).unwrap()
});

static NAMESPACE_PROP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:^|[{,\s])namespace\s*:\s*(?:"([^"\\]*)"|'([^'\\]*)'|`([^`$\\]*)`)\s*[,}]"#,
    )
    .unwrap()
});

/// How far back from a constructor call to look for its `const x =` binding.
const BINDING_LOOKBEHIND: usize = 256;

pub struct LexicalExtractor {
    options: ExtractorOptions,
    constructor_regex: Option<Regex>,
}

impl LexicalExtractor {
    pub fn new(options: ExtractorOptions) -> Self {
        let names: Vec<String> = options.accessors.all().map(regex::escape).collect();
        let constructor_regex = if names.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?:^|[^\w$.])({})\s*\(", names.join("|"))).ok()
        };
        Self {
            options,
            constructor_regex,
        }
    }

    /// Locate every constructor call: records sites and returns bindings with
    /// the byte offset from which they are live.
    fn scan_constructors(
        &self,
        text: &str,
        index: &LineIndex,
        result: &mut FileExtraction,
    ) -> Vec<(usize, NamespaceBinding)> {
        let mut bindings = Vec::new();
        let Some(regex) = &self.constructor_regex else {
            return bindings;
        };

        for caps in regex.captures_iter(text) {
            let Some(callee) = caps.get(1) else { continue };
            let Some(origin) = self.options.accessors.origin_of(callee.as_str()) else {
                continue;
            };
            let open = caps.get(0).map_or(callee.end(), |m| m.end() - 1);
            let close = find_closing_paren(text, open).unwrap_or(text.len());
            let args = text.get(open + 1..close).unwrap_or("");
            let namespace = parse_namespace_arg(args);

            let (line, col) = index.line_col(text, callee.start());
            result.accessors.push(AccessorSite {
                accessor: callee.as_str().to_string(),
                namespace: namespace.clone(),
                origin,
                line,
                col,
            });

            if let NamespaceArg::Literal(ns) = namespace
                && let Some(local_name) = binding_name_before(text, callee.start())
            {
                bindings.push((
                    close,
                    NamespaceBinding {
                        local_name,
                        namespace: ns,
                        origin,
                    },
                ));
            }
        }

        bindings
    }
}

impl KeyExtractor for LexicalExtractor {
    fn extract(&self, source: &str, _file_name: &str) -> Result<FileExtraction> {
        let text = mask_comments(source);
        let index = LineIndex::new(&text);
        let mut result = FileExtraction::default();

        let live = self.scan_constructors(&text, &index, &mut result);

        // name -> [(live_from, namespace)] in source order
        let mut by_name: HashMap<&str, Vec<(usize, &str)>> = HashMap::new();
        for (offset, binding) in &live {
            by_name
                .entry(binding.local_name.as_str())
                .or_default()
                .push((*offset, binding.namespace.as_str()));
        }

        for caps in KEY_CALL_REGEX.captures_iter(&text) {
            let Some(ident) = caps.get(1) else { continue };
            let Some(scopes) = by_name.get(ident.as_str()) else {
                continue;
            };
            // The most recent binding of this name before the call wins.
            let Some((_, namespace)) = scopes
                .iter()
                .rev()
                .find(|(offset, _)| *offset <= ident.start())
            else {
                continue;
            };
            let key = caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map(|m| m.as_str())
                .context("key call matched without a literal")?;
            result.keys.insert(*namespace, key);
        }

        for caps in IMPORT_REGEX.captures_iter(&text) {
            if let Some(spec) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) {
                result.push_import(spec.as_str(), &self.options.import_filter);
            }
        }

        result.bindings = live.into_iter().map(|(_, binding)| binding).collect();
        Ok(result)
    }
}

/// Name declared by `const <name> = [await]` right before `callee_start`.
fn binding_name_before(text: &str, callee_start: usize) -> Option<String> {
    let mut start = callee_start.saturating_sub(BINDING_LOOKBEHIND);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    let tail = text.get(start..callee_start)?;
    BINDING_TAIL_REGEX
        .captures(tail)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Interpret the raw argument text of a constructor call.
fn parse_namespace_arg(args: &str) -> NamespaceArg {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return NamespaceArg::Missing;
    }

    if let Some(caps) = LEADING_STRING_REGEX.captures(trimmed) {
        let whole = caps.get(0).map_or(0, |m| m.end());
        let rest = trimmed[whole..].trim_start();
        if rest.is_empty() || rest.starts_with(',') {
            let value = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            return if value.is_empty() {
                NamespaceArg::Missing
            } else {
                NamespaceArg::Literal(value.to_string())
            };
        }
        return NamespaceArg::Dynamic;
    }

    if trimmed.starts_with('{') {
        if let Some(caps) = NAMESPACE_PROP_REGEX.captures(trimmed) {
            let value = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            if !value.is_empty() {
                return NamespaceArg::Literal(value.to_string());
            }
        }
        if trimmed.contains("namespace") || trimmed.contains("...") {
            return NamespaceArg::Dynamic;
        }
        return NamespaceArg::Missing;
    }

    NamespaceArg::Dynamic
}

/// Byte offset of the `)` matching the `(` at `open`, skipping string contents.
fn find_closing_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
        } else {
            match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Replace `//` and `/* */` comments with spaces, keeping newlines and offsets.
pub fn mask_comments(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Str(u8),
        Line,
        Block,
    }

    let bytes = source.as_bytes();
    let mut out = bytes.to_vec();
    let mut state = State::Code;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    state = State::Line;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                (b'/', Some(b'*')) => {
                    state = State::Block;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                (b'"' | b'\'' | b'`', _) => state = State::Str(b),
                _ => {}
            },
            State::Str(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q || (b == b'\n' && q != b'`') {
                    state = State::Code;
                }
            }
            State::Line => {
                if b == b'\n' {
                    state = State::Code;
                } else {
                    out[i] = b' ';
                }
            }
            State::Block => {
                if b == b'*' && next == Some(b'/') {
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                    state = State::Code;
                } else if b != b'\n' {
                    out[i] = b' ';
                }
            }
        }
        i += 1;
    }

    // Only whole comment bytes were replaced with ASCII spaces.
    String::from_utf8(out).unwrap_or_else(|_| source.to_string())
}
