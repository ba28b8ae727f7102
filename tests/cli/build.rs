use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stderr, stdout};

const CLIENT_PAGE: &str = r#""use client";
import { useTranslations } from "next-intl";

export default function Page() {
  const t = useTranslations("common");
  return <p>{t("a.b")}</p>;
}
"#;

#[test]
fn test_build_writes_route_chunk_and_manifest() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", r#"{"common": {"a": {"b": "Hello", "c": "Unused"}}}"#),
        ("src/app/page.tsx", CLIENT_PAGE),
    ])?;

    let output = test.build()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_snapshot!(
        stdout(&output).trim_end(),
        @"✓ Extracted 1 route, 0 menus into 1 chunk file for 1 locale"
    );

    assert_eq!(test.read_output("index.en.json")?, json!({"common": {"a": {"b": "Hello"}}}));

    let manifest = test.read_output("manifest.json")?;
    assert_eq!(manifest["routes"]["/"]["chunk"], "index");
    assert_eq!(manifest["routes"]["/"]["pageType"], "user");
    assert_eq!(manifest["routes"]["/"]["entries"], json!(["src/app/page.tsx"]));
    assert_eq!(manifest["stats"]["chunks"], 1);

    Ok(())
}

#[test]
fn test_build_follows_imports_through_alias() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", r#"{"home": {"title": "Home"}, "nav": {"back": "Back"}}"#),
        (
            "src/app/[locale]/about/page.tsx",
            r#"import { BackLink } from "@/components/back-link";
export default async function About() {
  const t = await getTranslations("home");
  return <main>{t("title")}<BackLink /></main>;
}
"#,
        ),
        (
            "src/components/back-link.tsx",
            r#""use client";
export function BackLink() {
  const t = useTranslations("nav");
  return <a>{t("back")}</a>;
}
"#,
        ),
    ])?;

    let output = test.build()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        test.read_output("about.en.json")?,
        json!({"home": {"title": "Home"}, "nav": {"back": "Back"}})
    );

    Ok(())
}

#[test]
fn test_menu_keys_live_in_one_menu_chunk() -> Result<()> {
    let page = |ns: &str| {
        format!(
            "export default async function P() {{\n  const t = await getTranslations(\"{ns}\");\n  const m = await getTranslations(\"menu_user\");\n  return [t(\"hi\"), m(\"dashboard.title\")];\n}}\n"
        )
    };
    let dashboard = page("home");
    let settings = page("settings");
    let test = CliTest::with_files(&[
        (
            "messages/en.json",
            r#"{
  "home": {"hi": "Hi"},
  "settings": {"hi": "Settings"},
  "menu_user": {"dashboard": {"title": "Dashboard", "description": "Overview"}}
}"#,
        ),
        ("src/config/menu/user.ts", r#"export const menu = [{ key: "dashboard", href: "/dashboard" }];"#),
        ("src/app/dashboard/page.tsx", dashboard.as_str()),
        ("src/app/settings/page.tsx", settings.as_str()),
    ])?;

    let output = test.build()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(
        test.output_files()?,
        vec![
            "dashboard.en.json",
            "manifest.json",
            "menu-user.en.json",
            "settings.en.json",
        ]
    );
    assert_eq!(test.read_output("dashboard.en.json")?, json!({"home": {"hi": "Hi"}}));
    assert_eq!(
        test.read_output("menu-user.en.json")?,
        json!({"menu_user": {"dashboard": {"title": "Dashboard", "description": "Overview"}}})
    );

    let manifest = test.read_output("manifest.json")?;
    assert_eq!(manifest["routes"]["/settings"]["menuId"], "menu-user");
    assert_eq!(
        manifest["menus"]["menu-user"]["routes"],
        json!(["/dashboard", "/settings"])
    );

    Ok(())
}

#[test]
fn test_second_build_leaves_output_unchanged() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", r#"{"common": {"a": {"b": "Hello"}}}"#),
        ("messages/de.json", r#"{"common": {"a": {"b": "Hallo"}}}"#),
        ("src/app/page.tsx", CLIENT_PAGE),
    ])?;

    test.build()?;
    let first = test.read_file("public/locales/chunks/manifest.json")?;
    test.build()?;
    let second = test.read_file("public/locales/chunks/manifest.json")?;

    assert_eq!(first, second);
    assert_eq!(test.read_output("index.de.json")?, json!({"common": {"a": {"b": "Hallo"}}}));

    Ok(())
}

#[test]
fn test_build_removes_stale_chunks_only() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", r#"{"common": {"a": {"b": "Hello"}}}"#),
        ("src/app/page.tsx", CLIENT_PAGE),
        ("src/app/about/page.tsx", CLIENT_PAGE),
        ("public/locales/chunks/data.json", "{}"),
        ("public/locales/chunks/README.md", "kept"),
    ])?;

    test.build()?;
    assert_eq!(
        test.output_files()?,
        vec!["README.md", "about.en.json", "data.json", "index.en.json", "manifest.json"]
    );

    std::fs::remove_file(test.root().join("src/app/about/page.tsx"))?;
    test.build()?;
    assert_eq!(
        test.output_files()?,
        vec!["README.md", "data.json", "index.en.json", "manifest.json"]
    );

    Ok(())
}

#[test]
fn test_client_hook_in_server_page_fails_but_still_writes() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", r#"{"common": {"a": {"b": "Hello"}}}"#),
        (
            "src/app/page.tsx",
            r#"export default function Page() {
  const t = useTranslations("common");
  return <p>{t("a.b")}</p>;
}
"#,
        ),
    ])?;

    let output = test.build()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains("client-hook-in-server-component"));
    assert!(out.contains(" --> src/app/page.tsx:2:13"));
    assert!(out.contains("✘ 1 problem (1 error, 0 warnings)"));
    assert!(test.root().join("public/locales/chunks/index.en.json").exists());

    Ok(())
}

#[test]
fn test_output_dir_override() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", r#"{"common": {"a": {"b": "Hello"}}}"#),
        ("src/app/page.tsx", CLIENT_PAGE),
    ])?;

    let output = test
        .command()
        .args(["build", "--output-dir", "out/i18n", "--extractor", "ast"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.root().join("out/i18n/index.en.json").exists());

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_files(&[(".intlchunksrc.json", "{ not json")])?;

    let output = test.build()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error: Failed to parse config file"));

    Ok(())
}
