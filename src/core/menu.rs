//! Route classification and menu definition files.
//!
//! Every route is matched against an ordered table: excluded prefixes first,
//! then extension admin/user areas, then the plain admin and user menus. The
//! matched area decides which menu definition file the route shares with its
//! siblings, and that file is read once per run no matter how many routes
//! point at it.

use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{Config, MenuConfig};
use crate::core::{KeyMap, extract::lexical::mask_comments};

// `key: "admin/users"` or `key: 'dashboard'` inside a menu definition.
static MENU_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[^\w$])key\s*:\s*(?:"([^"\\\n]*)"|'([^'\\\n]*)')"#).unwrap()
});

const EXTENSION_PLACEHOLDER: &str = "{ext}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Admin,
    User,
    ExtensionAdmin,
    ExtensionUser,
    Excluded,
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PageType::Admin => "admin",
            PageType::User => "user",
            PageType::ExtensionAdmin => "extension-admin",
            PageType::ExtensionUser => "extension-user",
            PageType::Excluded => "excluded",
        };
        write!(f, "{}", s)
    }
}

/// The menu a route shares with other routes of the same area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRef {
    pub menu_id: String,
    pub namespace: String,
    /// Menu definition file, relative to the project root.
    pub source: String,
}

/// Page type and menu of a route pattern.
pub fn classify_route(route: &str, menus: &MenuConfig) -> (PageType, Option<MenuRef>) {
    if menus
        .excluded_prefixes
        .iter()
        .any(|prefix| has_route_prefix(route, prefix))
    {
        return (PageType::Excluded, None);
    }

    let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["admin", "ext", name, ..] => (
            PageType::ExtensionAdmin,
            Some(MenuRef {
                menu_id: format!("menu-ext-{}-admin", name),
                namespace: format!("{}{}", menus.extension_namespace_prefix, name),
                source: menus.extension_admin_menu.replace(EXTENSION_PLACEHOLDER, name),
            }),
        ),
        ["ext", name, ..] => (
            PageType::ExtensionUser,
            Some(MenuRef {
                menu_id: format!("menu-ext-{}-user", name),
                namespace: format!("{}{}", menus.extension_namespace_prefix, name),
                source: menus.extension_user_menu.replace(EXTENSION_PLACEHOLDER, name),
            }),
        ),
        ["admin", ..] => (
            PageType::Admin,
            Some(MenuRef {
                menu_id: "menu-admin".to_string(),
                namespace: "menu_admin".to_string(),
                source: menus.admin_menu.clone(),
            }),
        ),
        _ => (
            PageType::User,
            Some(MenuRef {
                menu_id: "menu-user".to_string(),
                namespace: "menu_user".to_string(),
                source: menus.user_menu.clone(),
            }),
        ),
    }
}

/// `/auth` covers `/auth` and `/auth/...` but not `/authors`.
fn has_route_prefix(route: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    route == prefix
        || route
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Title and description keys for every `key: "<id>"` item in a menu file.
///
/// Slashes in an id become nesting (`admin/users` -> `admin.users.title`).
pub fn extract_menu_keys(source: &str, namespace: &str) -> KeyMap {
    let masked = mask_comments(source);
    let mut keys = KeyMap::new();

    for caps in MENU_KEY_REGEX.captures_iter(&masked) {
        let Some(id) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let id = id.as_str().trim_matches('/').replace('/', ".");
        if id.is_empty() {
            continue;
        }
        keys.insert(namespace, format!("{}.title", id));
        keys.insert(namespace, format!("{}.description", id));
    }

    keys
}

/// Read a menu definition file. A missing file is an empty menu.
pub fn load_menu_keys(root: &Path, menu: &MenuRef) -> KeyMap {
    let path = Config::resolve_path(root, &menu.source);
    match fs::read_to_string(&path) {
        Ok(source) => extract_menu_keys(&source, &menu.namespace),
        Err(e) => {
            tracing::debug!(
                "No menu definition for {} at {}: {}",
                menu.menu_id,
                path.display(),
                e
            );
            KeyMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::core::menu::*;

    fn classify(route: &str) -> (PageType, Option<MenuRef>) {
        classify_route(route, &MenuConfig::default())
    }

    #[test]
    fn test_excluded_prefixes_win() {
        assert_eq!(classify("/auth").0, PageType::Excluded);
        assert_eq!(classify("/auth/reset").0, PageType::Excluded);
        assert_eq!(classify("/authors").0, PageType::User);
        assert!(classify("/login").1.is_none());
    }

    #[test]
    fn test_extension_routes() {
        let (page_type, menu) = classify("/admin/ext/staking/pools");
        let menu = menu.unwrap();
        assert_eq!(page_type, PageType::ExtensionAdmin);
        assert_eq!(menu.menu_id, "menu-ext-staking-admin");
        assert_eq!(menu.namespace, "ext_nav_staking");
        assert_eq!(menu.source, "src/app/admin/ext/staking/menu.ts");

        let (page_type, menu) = classify("/ext/staking");
        let menu = menu.unwrap();
        assert_eq!(page_type, PageType::ExtensionUser);
        assert_eq!(menu.menu_id, "menu-ext-staking-user");
        assert_eq!(menu.source, "src/app/ext/staking/menu.ts");
    }

    #[test]
    fn test_plain_admin_and_user() {
        let (page_type, menu) = classify("/admin/users");
        assert_eq!(page_type, PageType::Admin);
        assert_eq!(menu.unwrap().menu_id, "menu-admin");

        let (page_type, menu) = classify("/");
        assert_eq!(page_type, PageType::User);
        assert_eq!(menu.unwrap().namespace, "menu_user");

        // `/admin/ext` with no extension name is a plain admin page
        assert_eq!(classify("/admin/ext").0, PageType::Admin);
    }

    #[test]
    fn test_extract_menu_keys() {
        let source = r#"
export const menu = [
  { key: "dashboard", href: "/admin" },
  { key: 'admin/users', href: "/admin/users" },
  // { key: "commented" },
  { key: "deposit-methods", children: [{ key: "deposit-methods/new" }] },
];
"#;
        let keys = extract_menu_keys(source, "menu_admin");
        let listed: Vec<&String> = keys.keys("menu_admin").unwrap().iter().collect();
        assert_eq!(
            listed,
            vec![
                "admin.users.description",
                "admin.users.title",
                "dashboard.description",
                "dashboard.title",
                "deposit-methods.description",
                "deposit-methods.new.description",
                "deposit-methods.new.title",
                "deposit-methods.title",
            ]
        );
    }

    #[test]
    fn test_load_menu_keys_missing_file() {
        let dir = tempdir().unwrap();
        let (_, menu) = classify("/admin");
        assert!(load_menu_keys(dir.path(), &menu.unwrap()).is_empty());
    }
}
