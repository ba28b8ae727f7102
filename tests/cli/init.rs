use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "✓ Created .intlchunksrc.json");

    let content = test.read_file(".intlchunksrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["appDir"], "src/app");
    assert_eq!(parsed["outputDir"], "public/locales/chunks");
    assert_eq!(parsed["defaultLocale"], "en");
    assert!(parsed["menus"].is_object());
    assert!(content.contains("\n  \""), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_files(&[(".intlchunksrc.json", "{}")])?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".intlchunksrc.json already exists"));
    assert_eq!(test.read_file(".intlchunksrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;

    test.write_file("messages/en.json", r#"{"home": {"hi": "Hi"}}"#)?;
    test.write_file(
        "src/app/page.tsx",
        "export default async function P() { const t = await getTranslations(\"home\"); return t(\"hi\"); }",
    )?;

    let output = test.build()?;
    assert!(
        output.status.success(),
        "Build should work with initialized config. stderr: {}",
        stderr(&output)
    );
    assert_eq!(test.read_output("index.en.json")?, serde_json::json!({"home": {"hi": "Hi"}}));

    Ok(())
}
