use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in [
        "sourceRoot",
        "includes",
        "outputDir",
        "sourceLanguage",
        "targetLanguages",
        "keyStrategy",
        "translationModule",
        "strategy",
    ] {
        assert!(parsed.get(field).is_some(), "Config should have '{}' field", field);
    }
    assert_eq!(parsed["sourceLanguage"], "en");
    assert_eq!(parsed["strategy"], "auto");

    assert!(
        content.contains("  \"includes\""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));
    insta::assert_snapshot!(stdout(&output), @"✓ Created .i18nizerc.json");

    assert!(test.root().join(".i18nizerc.json").exists());
    let content = test.read_file(".i18nizerc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".i18nizerc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: .i18nizerc.json already exists"));
    assert_eq!(test.read_file(".i18nizerc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file(
        "src/App.tsx",
        "export function App() {\n  return <div>Hello world</div>;\n}\n",
    )?;

    let output = test.run_command().output()?;
    assert!(
        output.status.success(),
        "Run should work with initialized config. stderr: {}",
        stderr(&output)
    );
    assert!(stdout(&output).contains("Would rewrite 1 fragment(s) in 1 file(s)"));

    Ok(())
}
