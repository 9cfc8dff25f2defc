use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stderr, stdout};

const LOGIN: &str = r#"import React from "react";

export function Login() {
  return (
    <form>
      <h1>Welcome</h1>
      <input placeholder="Enter email" />
    </form>
  );
}
"#;

fn project() -> Result<CliTest> {
    let test = CliTest::with_file("package.json", r#"{"name": "app"}"#)?;
    test.write_file(
        ".i18nizerc.json",
        r#"{"targetLanguages": ["es"], "outputDir": "./locales"}"#,
    )?;
    test.write_file("src/Login.tsx", LOGIN)?;
    Ok(test)
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
    let test = project()?;

    let output = test.run_command().output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("text: \"Welcome\""));
    assert!(out.contains("--> src/Login.tsx:6:11"));
    assert!(out.contains("placeholder: \"Enter email\""));
    assert!(out.contains("Would rewrite 2 fragment(s) in 1 file(s) (structural strategy):"));
    assert!(out.contains("Run with --apply to write these changes."));

    assert_eq!(test.read_file("src/Login.tsx")?, LOGIN);
    assert!(!test.root().join("locales").exists());

    Ok(())
}

#[test]
fn test_apply_rewrites_and_writes_catalogs() -> Result<()> {
    let test = project()?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Rewrote 2 fragment(s) in 1 file(s)"));
    assert!(out.contains("- wrote locales/en.json"));
    assert!(out.contains("- wrote locales/es.json"));

    insta::assert_snapshot!(test.read_file("locales/en.json")?, @r#"
    {
      "Enter email": "Enter email",
      "Welcome": "Welcome"
    }
    "#);
    assert_eq!(
        test.read_json("locales/es.json")?,
        json!({"Welcome": "", "Enter email": ""})
    );

    let source = test.read_file("src/Login.tsx")?;
    assert!(source.contains("<h1>{t(\"Welcome\")}</h1>"));
    assert!(source.contains("placeholder={t(\"Enter email\")}"));
    assert_eq!(
        source
            .matches("import { useTranslation } from \"react-i18next\";")
            .count(),
        1
    );
    assert_eq!(source.matches("const { t } = useTranslation();").count(), 1);

    Ok(())
}

#[test]
fn test_second_apply_is_a_no_op() -> Result<()> {
    let test = project()?;

    test.run_command().arg("--apply").output()?;
    let source = test.read_file("src/Login.tsx")?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("no hardcoded text found"));
    assert_eq!(test.read_file("src/Login.tsx")?, source);

    Ok(())
}

#[test]
fn test_class_text_added_later_imports_adapter() -> Result<()> {
    let test = CliTest::with_file("package.json", r#"{"name": "app"}"#)?;
    test.write_file(
        "src/Page.tsx",
        r#"import { Component } from "react";

export function Header() {
  return <h1>Site header</h1>;
}

class Page extends Component {
  render() {
    return <p>{null}</p>;
  }
}

export default Page;
"#,
    )?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let source = test
        .read_file("src/Page.tsx")?
        .replace("<p>{null}</p>", "<p>Page body text</p>");
    test.write_file("src/Page.tsx", &source)?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let source = test.read_file("src/Page.tsx")?;
    assert!(source.contains(
        "import { useTranslation, withTranslation } from \"react-i18next\";"
    ));
    assert_eq!(source.matches("from \"react-i18next\"").count(), 1);
    assert!(source.contains("<p>{this.props.t(\"Page body text\")}</p>"));
    assert!(source.contains("export default withTranslation()(Page);"));

    Ok(())
}

#[test]
fn test_entities_are_decoded_in_catalog() -> Result<()> {
    let test = project()?;
    test.write_file(
        "src/Login.tsx",
        "export function Login() {\n  return <p>Terms &amp; conditions</p>;\n}\n",
    )?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(
        test.read_file("src/Login.tsx")?
            .contains("<p>{t(\"Terms & conditions\")}</p>")
    );
    assert_eq!(
        test.read_json("locales/en.json")?,
        json!({"Terms & conditions": "Terms & conditions"})
    );

    Ok(())
}

#[test]
fn test_existing_translations_survive() -> Result<()> {
    let test = project()?;
    test.write_file("locales/es.json", r#"{"Welcome": "Bienvenido"}"#)?;
    test.write_file(
        "src/Login.tsx",
        "export function Login() {\n  return <main><h1>Welcome</h1><button>Get Started</button></main>;\n}\n",
    )?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        test.read_json("locales/es.json")?,
        json!({"Welcome": "Bienvenido", "Get Started": ""})
    );

    Ok(())
}

#[test]
fn test_cli_overrides_config() -> Result<()> {
    let test = project()?;

    let output = test
        .run_command()
        .args([
            "--apply",
            "--strategy",
            "pattern",
            "--output-dir",
            "i18n",
            "--target-language",
            "fr",
        ])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("(pattern strategy)"));

    assert!(test.root().join("i18n/en.json").exists());
    assert!(test.root().join("i18n/fr.json").exists());
    assert!(!test.root().join("i18n/es.json").exists());
    assert!(!test.root().join("locales").exists());

    Ok(())
}

#[test]
fn test_parse_error_does_not_fail_the_run() -> Result<()> {
    let test = project()?;
    test.write_file(
        "src/Broken.tsx",
        "export function Broken() { return <div>; }\n",
    )?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(0));

    let out = stdout(&output);
    assert!(out.contains("--> src/Broken.tsx"));
    assert!(out.contains("1 file could not be processed"));
    assert!(test.read_file("src/Login.tsx")?.contains("{t(\"Welcome\")}"));

    Ok(())
}

#[test]
fn test_invalid_config_exits_with_error() -> Result<()> {
    let test = CliTest::with_file(
        ".i18nizerc.json",
        r#"{"sourceLanguage": "", "minLength": 10, "maxLength": 5}"#,
    )?;
    test.write_file("src/App.tsx", LOGIN)?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(2));

    let err = stderr(&output);
    assert!(err.contains("error: invalid configuration"));
    assert!(err.contains("'sourceLanguage' is required"));
    assert!(err.contains("'minLength' (10) is greater than 'maxLength' (5)"));
    assert_eq!(test.read_file("src/App.tsx")?, LOGIN);

    Ok(())
}

#[test]
fn test_missing_source_root_exits_with_error() -> Result<()> {
    let test = project()?;

    let output = test
        .run_command()
        .args(["--source-root", "does-not-exist"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("source directory does not exist"));

    Ok(())
}

#[test]
fn test_unwritable_output_dir_is_fatal() -> Result<()> {
    let test = project()?;
    // A file where the output directory should be.
    test.write_file("locales", "")?;

    let output = test.run_command().arg("--apply").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("error:"));

    Ok(())
}

#[test]
fn test_malformed_config_file() -> Result<()> {
    let test = CliTest::with_file(".i18nizerc.json", "{ not json")?;

    let output = test.run_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to parse config file"));

    Ok(())
}
