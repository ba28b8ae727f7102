use anyhow::Result;
use insta::assert_snapshot;

use crate::{CliTest, stdout};

#[test]
fn test_check_clean_project() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", r#"{"home": {"hi": "Hi"}}"#),
        (
            "src/app/page.tsx",
            "export default async function P() { const t = await getTranslations(\"home\"); return t(\"hi\"); }",
        ),
    ])?;

    let output = test.check()?;
    assert!(output.status.success());
    assert_snapshot!(
        stdout(&output).trim_end(),
        @"✓ Checked 1 source file, 1 locale file - no issues found"
    );
    assert!(!test.root().join("public/locales/chunks").exists());

    Ok(())
}

#[test]
fn test_check_missing_namespace_is_an_error() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", "{}"),
        (
            "src/components/widget.tsx",
            "\"use client\";\nexport function W() { const t = useTranslations(); return t(\"x\"); }",
        ),
    ])?;

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains("missing-namespace"));
    assert!(out.contains("--> src/components/widget.tsx:2:"));

    Ok(())
}

#[test]
fn test_check_loading_view_hint() -> Result<()> {
    let test = CliTest::with_files(&[
        ("messages/en.json", "{}"),
        (
            "src/app/loading.tsx",
            "export default function Loading() {\n  const t = useTranslations(\"common\");\n  return t(\"loading\");\n}\n",
        ),
    ])?;

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("= help:"));

    Ok(())
}

#[test]
fn test_check_bad_locale_is_a_warning() -> Result<()> {
    let test = CliTest::with_files(&[("messages/en.json", "{ broken")])?;

    let output = test.check()?;
    assert_eq!(output.status.code(), Some(0));

    let out = stdout(&output);
    assert!(out.starts_with("warning:"));
    assert!(out.contains("--> messages/en.json"));
    assert!(out.contains("(0 errors, 1 warning)"));

    Ok(())
}
