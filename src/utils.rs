//! Common utility functions shared across the codebase.

/// Byte offsets of line starts, for O(log n) offset → line/column lookups.
///
/// Line 1 starts at offset 0, line 2 starts after the first `'\n'`, etc.
#[derive(Debug, Clone)]
pub struct LineIndex {
    offsets: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut offsets = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                offsets.push(i + 1);
            }
        }
        Self { offsets }
    }

    /// 1-based line number for a byte offset.
    pub fn line(&self, offset: usize) -> usize {
        match self.offsets.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// 1-based `(line, column)` for a byte offset. The column counts chars.
    pub fn line_col(&self, content: &str, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let start = self.offsets[line - 1];
        let col = content
            .get(start..offset)
            .map_or(1, |prefix| prefix.chars().count() + 1);
        (line, col)
    }

    /// Text of a 1-based line, without the trailing newline.
    pub fn line_text<'a>(&self, content: &'a str, line: usize) -> &'a str {
        let Some(&start) = self.offsets.get(line.saturating_sub(1)) else {
            return "";
        };
        let end = self.offsets.get(line).map_or(content.len(), |&next| next);
        content
            .get(start..end)
            .unwrap_or("")
            .trim_end_matches(['\n', '\r'])
    }
}

/// Turns a route pattern into the file-name slug used for chunk files.
///
/// The leading slash is stripped, remaining slashes become dashes and the
/// brackets around dynamic segments are dropped. The root route becomes `index`.
///
/// # Examples
///
/// ```
/// use intl_chunks::utils::route_slug;
///
/// assert_eq!(route_slug("/admin/users"), "admin-users");
/// assert_eq!(route_slug("/blog/[slug]/edit"), "blog-slug-edit");
/// assert_eq!(route_slug("/"), "index");
/// ```
pub fn route_slug(route: &str) -> String {
    let trimmed = route.trim_start_matches('/');
    if trimmed.is_empty() {
        return "index".to_string();
    }
    trimmed
        .replace('/', "-")
        .chars()
        .filter(|c| *c != '[' && *c != ']')
        .collect()
}

/// Normalize a path to forward slashes for stable, platform-independent output.
pub fn to_slash(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
