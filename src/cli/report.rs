//! Report formatting and printing utilities.
//!
//! Cargo-style output for the CLI. Kept apart from the engine so i18nize can
//! be used as a library without printing anything.

use std::{
    io::{self, Write},
    path::Path,
};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::{
    FragmentKind, TextExtraction, TransformResult,
    validator::{Severity, ValidationReport, Verdict},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Warnings shown without `-v`.
const MAX_WARNINGS_DISPLAY: usize = 5;

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

/// Print every configuration problem to stderr.
pub fn print_config_errors(problems: &[String]) {
    print_config_errors_to(problems, &mut io::stderr().lock());
}

pub fn print_config_errors_to<W: Write>(problems: &[String], writer: &mut W) {
    let _ = writeln!(writer, "{} invalid configuration", "error:".bold().red());
    for problem in problems {
        let _ = writeln!(writer, "  - {}", problem);
    }
}

pub fn print_warning(message: &str) {
    let _ = writeln!(
        io::stderr().lock(),
        "{} {}",
        "warning:".bold().yellow(),
        message
    );
}

/// Print the outcome of a `run`.
///
/// A dry run lists every fragment that would be extracted; `verbose` lists
/// them after an applied run too, along with every warning.
pub fn print_run(result: &TransformResult, root: &Path, apply: bool, verbose: bool) {
    print_run_to(result, root, apply, verbose, &mut io::stdout().lock());
}

pub fn print_run_to<W: Write>(
    result: &TransformResult,
    root: &Path,
    apply: bool,
    verbose: bool,
    writer: &mut W,
) {
    if !apply || verbose {
        let max_line_width = result
            .extractions
            .iter()
            .map(|e| e.line)
            .max()
            .map(|n| n.to_string().len())
            .unwrap_or(1);
        for extraction in &result.extractions {
            print_extraction(extraction, writer, max_line_width);
        }
    }

    for error in &result.stats.errors {
        let _ = writeln!(writer, "{}: {}", "error".bold().red(), error.message);
        let _ = writeln!(writer, "  {} {}", "-->".blue(), error.file_path);
        let _ = writeln!(writer);
    }

    print_warnings(&result.stats.warnings, verbose, writer);
    print_run_summary(result, root, apply, writer);
}

fn print_extraction<W: Write>(extraction: &TextExtraction, writer: &mut W, max_line_width: usize) {
    let _ = writeln!(
        writer,
        "{}: \"{}\"",
        extraction.kind.to_string().bold().green(),
        extraction.text
    );
    let _ = writeln!(
        writer,
        "  {} {}:{}:{}",
        "-->".blue(),
        extraction.file_path,
        extraction.line,
        extraction.col
    );

    let source_line = extraction.source_line.as_str();
    let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
    let _ = writeln!(
        writer,
        "{:>width$} {} {}",
        extraction.line.to_string().blue(),
        "|".blue(),
        source_line,
        width = max_line_width
    );

    // col is 1-based and counts characters; attribute ranges include the quotes
    let prefix: String = source_line.chars().take(extraction.col.saturating_sub(1)).collect();
    let quotes = match extraction.kind {
        FragmentKind::ElementText => 0,
        FragmentKind::PlaceholderAttribute | FragmentKind::LabelAttribute => 2,
    };
    let underline = (UnicodeWidthStr::width(extraction.text.as_str()) + quotes).max(1);
    let _ = writeln!(
        writer,
        "{:>width$} {} {:>padding$}{}",
        "",
        "|".blue(),
        "",
        "^".repeat(underline).green(),
        width = max_line_width,
        padding = UnicodeWidthStr::width(prefix.as_str())
    );
    let _ = writeln!(
        writer,
        "{:>width$} {} {} {}",
        "",
        "=".blue(),
        "key:".bold(),
        extraction.key,
        width = max_line_width
    );
    let _ = writeln!(writer);
}

fn print_warnings<W: Write>(warnings: &[String], verbose: bool, writer: &mut W) {
    let shown = if verbose {
        warnings.len()
    } else {
        warnings.len().min(MAX_WARNINGS_DISPLAY)
    };
    for warning in &warnings[..shown] {
        let _ = writeln!(writer, "{} {}", "warning:".bold().yellow(), warning);
    }
    let hidden = warnings.len() - shown;
    if hidden > 0 {
        let _ = writeln!(
            writer,
            "{} {} more {} (use {} for details)",
            "warning:".bold().yellow(),
            hidden,
            plural(hidden, "warning", "warnings"),
            "-v".cyan()
        );
    }
}

fn print_run_summary<W: Write>(result: &TransformResult, root: &Path, apply: bool, writer: &mut W) {
    let stats = &result.stats;
    let fragments = stats.fragments_transformed;
    let files = result.modified_files.len();

    if fragments == 0 && files == 0 && result.catalog_files.is_empty() {
        if stats.errors.is_empty() {
            let _ = writeln!(
                writer,
                "{} {}",
                SUCCESS_MARK.green(),
                format!(
                    "Checked {} source {} - no hardcoded text found",
                    stats.files_processed,
                    plural(stats.files_processed, "file", "files")
                )
                .green()
            );
        }
    } else {
        let verb = if apply {
            "Rewrote".green().bold()
        } else {
            "Would rewrite".yellow().bold()
        };
        let _ = writeln!(
            writer,
            "{} {} fragment(s) in {} file(s) ({} strategy):",
            verb, fragments, files, result.strategy
        );
        let _ = writeln!(
            writer,
            "  - imports: {}, hooks: {}, adapters: {}",
            stats.imports_added, stats.hooks_added, stats.adapters_added
        );
        let _ = writeln!(
            writer,
            "  - catalog: {} key(s), {} duplicate(s) collapsed",
            result.translations.len(),
            stats.duplicates
        );
        for path in &result.catalog_files {
            let _ = writeln!(
                writer,
                "  - wrote {}",
                path.strip_prefix(root).unwrap_or(path).display()
            );
        }
        if !apply {
            let _ = writeln!(writer, "Run with {} to write these changes.", "--apply".cyan());
        }
    }

    if !stats.errors.is_empty() {
        let count = stats.errors.len();
        let _ = writeln!(
            writer,
            "\n{} {} {} could not be processed",
            FAILURE_MARK.red(),
            count,
            plural(count, "file", "files")
        );
    }
}

/// Print one verdict per text, with the rules that matched.
pub fn print_validation(reports: &[ValidationReport]) {
    print_validation_to(reports, &mut io::stdout().lock());
}

pub fn print_validation_to<W: Write>(reports: &[ValidationReport], writer: &mut W) {
    for report in reports {
        match &report.verdict {
            Verdict::Accept => {
                let _ = writeln!(
                    writer,
                    "{} \"{}\"  {}",
                    SUCCESS_MARK.green(),
                    report.text,
                    "translatable".green()
                );
            }
            Verdict::Reject(reason) => {
                let _ = writeln!(
                    writer,
                    "{} \"{}\"  {} {}",
                    FAILURE_MARK.red(),
                    report.text,
                    "skipped:".red(),
                    reason
                );
            }
        }

        for hit in report.warnings().chain(report.infos()) {
            let label = match hit.severity {
                Severity::Warn => "warning:".bold().yellow(),
                _ => "info:".bold().cyan(),
            };
            let _ = writeln!(
                writer,
                "  {} {} {} {}",
                "=".blue(),
                label,
                hit.name.dimmed().cyan(),
                hit.description
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use crate::config::Config;
    use crate::core::validator::TextValidator;
    use crate::core::{FileError, TransformStats};

    fn strip_ansi(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn result() -> TransformResult {
        TransformResult {
            success: true,
            strategy: "structural",
            stats: TransformStats::default(),
            translations: BTreeMap::new(),
            modified_files: Vec::new(),
            catalog_files: Vec::new(),
            extractions: Vec::new(),
            fatal_error: None,
        }
    }

    fn extraction(text: &str, kind: FragmentKind, col: usize, source_line: &str) -> TextExtraction {
        TextExtraction {
            text: text.to_string(),
            key: text.to_string(),
            kind,
            file_path: "src/App.tsx".to_string(),
            line: 3,
            col,
            source_line: source_line.to_string(),
        }
    }

    fn render_run(result: &TransformResult, apply: bool, verbose: bool) -> String {
        let mut output = Vec::new();
        print_run_to(result, Path::new("/project"), apply, verbose, &mut output);
        strip_ansi(&String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_nothing_found() {
        let mut result = result();
        result.stats.files_processed = 4;

        let output = render_run(&result, false, false);
        assert!(output.contains("Checked 4 source files - no hardcoded text found"));
    }

    #[test]
    fn test_dry_run_lists_extractions() {
        let mut result = result();
        result.extractions = vec![extraction(
            "Welcome",
            FragmentKind::ElementText,
            9,
            "    <h1>Welcome</h1>",
        )];
        result.stats.fragments_transformed = 1;
        result.stats.imports_added = 1;
        result.stats.hooks_added = 1;
        result.modified_files = vec![PathBuf::from("/project/src/App.tsx")];
        result
            .translations
            .insert("Welcome".to_string(), "Welcome".to_string());

        let output = render_run(&result, false, false);
        assert!(output.contains("text: \"Welcome\""));
        assert!(output.contains("--> src/App.tsx:3:9"));
        assert!(output.contains("3 |     <h1>Welcome</h1>"));
        assert!(output.contains("  |         ^^^^^^^\n"));
        assert!(output.contains("= key: Welcome"));
        assert!(output.contains("Would rewrite 1 fragment(s) in 1 file(s) (structural strategy):"));
        assert!(output.contains("imports: 1, hooks: 1, adapters: 0"));
        assert!(output.contains("Run with --apply"));
    }

    #[test]
    fn test_attribute_underline_covers_quotes() {
        let mut result = result();
        let line = r#"  <input placeholder="Email" />"#;
        result.extractions = vec![extraction("Email", FragmentKind::PlaceholderAttribute, 22, line)];

        let output = render_run(&result, false, false);
        assert!(output.contains(&format!("  | {}^^^^^^^\n", " ".repeat(21))));
    }

    #[test]
    fn test_applied_run_lists_catalogs() {
        let mut result = result();
        result.stats.fragments_transformed = 2;
        result.modified_files = vec![PathBuf::from("/project/src/App.tsx")];
        result.catalog_files = vec![
            PathBuf::from("/project/locales/en.json"),
            PathBuf::from("/project/locales/es.json"),
        ];
        result.extractions = vec![extraction("Hi", FragmentKind::ElementText, 1, "Hi")];

        let output = render_run(&result, true, false);
        assert!(output.contains("Rewrote 2 fragment(s) in 1 file(s)"));
        assert!(output.contains("- wrote locales/en.json"));
        assert!(output.contains("- wrote locales/es.json"));
        assert!(!output.contains("Run with --apply"));
        assert!(!output.contains("text: \"Hi\""));
    }

    #[test]
    fn test_errors_and_warnings() {
        let mut result = result();
        result.stats.errors = vec![FileError {
            file_path: "src/Broken.tsx".to_string(),
            message: "Failed to parse src/Broken.tsx".to_string(),
        }];
        result.stats.warnings = (0..7).map(|i| format!("warning number {}", i)).collect();

        let output = render_run(&result, false, false);
        assert!(output.contains("error: Failed to parse src/Broken.tsx"));
        assert!(output.contains("--> src/Broken.tsx"));
        assert!(output.contains("warning: warning number 4"));
        assert!(!output.contains("warning number 5"));
        assert!(output.contains("2 more warnings (use -v for details)"));
        assert!(output.contains("1 file could not be processed"));
        assert!(!output.contains("no hardcoded text found"));

        let output = render_run(&result, false, true);
        assert!(output.contains("warning number 6"));
        assert!(!output.contains("more warnings"));
    }

    #[test]
    fn test_config_errors() {
        let mut output = Vec::new();
        print_config_errors_to(
            &["'sourceLanguage' is required".to_string()],
            &mut output,
        );
        let output = strip_ansi(&String::from_utf8(output).unwrap());
        assert_eq!(
            output,
            "error: invalid configuration\n  - 'sourceLanguage' is required\n"
        );
    }

    #[test]
    fn test_validation_report() {
        let (validator, _) = TextValidator::new(&Config::default());
        let reports = vec![
            validator.detailed_report("Save Changes"),
            validator.detailed_report("true"),
        ];

        let mut output = Vec::new();
        print_validation_to(&reports, &mut output);
        let output = strip_ansi(&String::from_utf8(output).unwrap());

        assert!(output.contains("\u{2713} \"Save Changes\"  translatable"));
        assert!(output.contains("\u{2718} \"true\"  skipped: technical term"));
    }
}
