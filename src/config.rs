use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".intlchunksrc.json";

/// Directories never descended into while scanning, at any depth.
pub const PRUNED_DIRS: &[&str] = &["node_modules", ".git"];

/// Build output directories, skipped only directly under the project root so
/// app routes named `build` or `out` are still scanned.
pub const BUILD_OUTPUT_DIRS: &[&str] = &[".next", "dist", "build", "out"];

/// Which extraction strategy turns a source file into bindings and keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Regex matching over comment-masked source text.
    #[default]
    Lexical,
    /// Full TSX parse with scope-aware binding tracking.
    Ast,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_app_dir")]
    pub app_dir: String,
    #[serde(default = "default_messages_dir", alias = "messagesRoot")]
    pub messages_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default)]
    pub always_include_namespaces: Vec<String>,
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
    #[serde(default = "default_reserved_segments")]
    pub reserved_segments: Vec<String>,
    #[serde(default = "default_entry_file_names")]
    pub entry_file_names: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub extractor: ExtractorKind,
    #[serde(default = "default_sync_accessors")]
    pub sync_accessors: Vec<String>,
    #[serde(default = "default_async_accessors")]
    pub async_accessors: Vec<String>,
    #[serde(default)]
    pub menus: MenuConfig,
}

/// Where menu definition files live and how their keys are namespaced.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuConfig {
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
    #[serde(default = "default_admin_menu")]
    pub admin_menu: String,
    #[serde(default = "default_user_menu")]
    pub user_menu: String,
    #[serde(default = "default_extension_admin_menu")]
    pub extension_admin_menu: String,
    #[serde(default = "default_extension_user_menu")]
    pub extension_user_menu: String,
    #[serde(default = "default_extension_namespace_prefix")]
    pub extension_namespace_prefix: String,
}

fn default_app_dir() -> String {
    "src/app".to_string()
}

fn default_messages_dir() -> String {
    "messages".to_string()
}

fn default_output_dir() -> String {
    "public/locales/chunks".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("@/".to_string(), "src/".to_string())])
}

fn default_reserved_segments() -> Vec<String> {
    vec!["i18n".to_string()]
}

fn default_entry_file_names() -> Vec<String> {
    ["page", "layout"].map(String::from).to_vec()
}

fn default_extensions() -> Vec<String> {
    ["tsx", "ts", "jsx", "js"].map(String::from).to_vec()
}

fn default_max_depth() -> usize {
    10
}

fn default_sync_accessors() -> Vec<String> {
    vec!["useTranslations".to_string()]
}

fn default_async_accessors() -> Vec<String> {
    vec!["getTranslations".to_string()]
}

fn default_excluded_prefixes() -> Vec<String> {
    ["/auth", "/login", "/register", "/error"]
        .map(String::from)
        .to_vec()
}

fn default_admin_menu() -> String {
    "src/config/menu/admin.ts".to_string()
}

fn default_user_menu() -> String {
    "src/config/menu/user.ts".to_string()
}

fn default_extension_admin_menu() -> String {
    "src/app/admin/ext/{ext}/menu.ts".to_string()
}

fn default_extension_user_menu() -> String {
    "src/app/ext/{ext}/menu.ts".to_string()
}

fn default_extension_namespace_prefix() -> String {
    "ext_nav_".to_string()
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: default_excluded_prefixes(),
            admin_menu: default_admin_menu(),
            user_menu: default_user_menu(),
            extension_admin_menu: default_extension_admin_menu(),
            extension_user_menu: default_extension_user_menu(),
            extension_namespace_prefix: default_extension_namespace_prefix(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            messages_dir: default_messages_dir(),
            output_dir: default_output_dir(),
            default_locale: default_locale(),
            always_include_namespaces: Vec::new(),
            aliases: default_aliases(),
            reserved_segments: default_reserved_segments(),
            entry_file_names: default_entry_file_names(),
            extensions: default_extensions(),
            ignores: Vec::new(),
            max_depth: default_max_depth(),
            extractor: ExtractorKind::default(),
            sync_accessors: default_sync_accessors(),
            async_accessors: default_async_accessors(),
            menus: MenuConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns in `ignores`, a zero
    /// `maxDepth` or an empty extension list.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.max_depth == 0 {
            bail!("'maxDepth' must be at least 1");
        }

        if self.extensions.is_empty() {
            bail!("'extensions' must list at least one source extension");
        }

        if self.sync_accessors.is_empty() && self.async_accessors.is_empty() {
            bail!("At least one of 'syncAccessors' or 'asyncAccessors' must be set");
        }

        Ok(())
    }

    /// Compiled `ignores` patterns. Call after `validate`.
    pub fn ignore_patterns(&self) -> Vec<Pattern> {
        self.ignores
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect()
    }

    /// Resolve a config path (which may be absolute) against the project root.
    pub fn resolve_path(root: &Path, value: &str) -> PathBuf {
        let p = Path::new(value);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p.strip_prefix("./").unwrap_or(p))
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
