//! Locale message files: one `<locale>.json` per locale, each an object keyed
//! by namespace.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::issues::LocaleParseIssue;

/// Full translation tree per locale, keyed by locale code.
pub type LocaleTrees = BTreeMap<String, Value>;

#[derive(Debug, Default)]
pub struct LoadLocalesResult {
    pub locales: LocaleTrees,
    pub warnings: Vec<LocaleParseIssue>,
}

pub fn parse_locale_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read locale file: {:?}", path))?;

    let json: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse locale file: {:?}", path))?;

    if !json.is_object() {
        bail!(
            "Locale file {:?} must contain a JSON object keyed by namespace",
            path
        );
    }

    Ok(json)
}

/// Locale code of a message file (`messages/en.json` -> `en`).
pub fn extract_locale(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Load every `*.json` file in `messages_dir`.
///
/// Nothing here fails the run: a missing directory or a malformed file
/// becomes a warning and the affected locale is skipped.
pub fn load_locale_files(messages_dir: impl AsRef<Path>) -> LoadLocalesResult {
    let messages_dir = messages_dir.as_ref();
    let mut result = LoadLocalesResult::default();

    let entries = match fs::read_dir(messages_dir) {
        Ok(entries) => entries,
        Err(e) => {
            result.warnings.push(LocaleParseIssue {
                file_path: messages_dir.to_string_lossy().to_string(),
                error: format!("Cannot read messages directory: {}", e),
            });
            return result;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) == Some("json")
            && let Some(locale) = extract_locale(&path)
        {
            match parse_locale_file(&path) {
                Ok(tree) => {
                    result.locales.insert(locale, tree);
                }
                Err(e) => {
                    tracing::debug!("Skipping locale {}: {:#}", locale, e);
                    result.warnings.push(LocaleParseIssue {
                        file_path: path.to_string_lossy().to_string(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }
    }

    result
}
