use anyhow::Result;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_validate_verdicts() -> Result<()> {
    let test = CliTest::new()?;

    let output = test
        .validate_command()
        .args(["Save Changes", "true", "123", "./src/x", "100px", "<div>"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("✓ \"Save Changes\"  translatable"));
    assert!(out.contains("✘ \"true\"  skipped: technical term"));
    assert!(out.contains("✘ \"123\"  skipped: numeric"));
    assert!(out.contains("✘ \"./src/x\"  skipped: path or url"));
    assert!(out.contains("✘ \"100px\"  skipped:"));
    assert!(out.contains("✘ \"<div>\"  skipped:"));
    assert_eq!(out.matches('✓').count(), 1);

    Ok(())
}

#[test]
fn test_validate_accepts_layout_labels() -> Result<()> {
    let test = CliTest::new()?;

    let output = test
        .validate_command()
        .args(["Options", "Left", "Hidden", "inherit"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("✓ \"Options\"  translatable"));
    assert!(out.contains("✓ \"Left\"  translatable"));
    assert!(out.contains("✓ \"Hidden\"  translatable"));
    assert!(out.contains("✘ \"inherit\"  skipped: technical term"));

    Ok(())
}

#[test]
fn test_validate_uses_config_skip_patterns() -> Result<()> {
    let test = CliTest::with_file(".i18nizerc.json", r#"{"skipPatterns": ["^TODO"]}"#)?;

    let output = test.validate_command().arg("TODO fix this").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("skipped: custom skip pattern"));

    Ok(())
}

#[test]
fn test_validate_reports_bad_skip_pattern() -> Result<()> {
    let test = CliTest::with_file(".i18nizerc.json", r#"{"skipPatterns": ["(unclosed"]}"#)?;

    let output = test.validate_command().arg("Hello there").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("warning:"));
    assert!(stdout(&output).contains("translatable"));

    Ok(())
}

#[test]
fn test_validate_requires_text() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.validate_command().output()?;
    assert_eq!(output.status.code(), Some(2));

    Ok(())
}
