//! Source-text edits shared by both strategies.
//!
//! Strategies locate *where* to edit (from the AST or from regex matches);
//! this module decides *what* the inserted code looks like and applies the
//! edits without disturbing the rest of the file.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::utils::line_indent;

pub const HOOK_NAME: &str = "useTranslation";
pub const ADAPTER_NAME: &str = "withTranslation";
pub const TRANSLATE_FN: &str = "t";
pub const CLASS_TRANSLATE_FN: &str = "this.props.t";

// Multi-line `import ... from "x"` plus bare `import "x"`, and `require("x")`.
static IMPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*import\s([^;'"]*?)from\s*['"]([^'"]+)['"][ \t]*;?|^[ \t]*import\s*['"]([^'"]+)['"][ \t]*;?|\brequire\(\s*['"]([^'"]+)['"]\s*\)[^\n]*"#,
    )
    .unwrap()
});

static DIRECTIVES_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:\s*(?:"use [\w ]+"|'use [\w ]+');?[ \t]*\r?\n)+"#).unwrap()
});

/// Replace `start..end` with `replacement`. Empty ranges are insertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }
}

/// Apply non-overlapping edits. Insertions at the same offset keep their
/// relative order.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|e| (e.start, e.end));
    let mut out = source.to_string();
    for edit in edits.iter().rev() {
        out.replace_range(edit.start..edit.end, &edit.replacement);
    }
    out
}

/// `t("key")` with the key as a double-quoted, escaped string literal.
pub fn translation_call(function: &str, key: &str) -> String {
    format!("{}({})", function, Value::String(key.to_string()))
}

/// `{t("key")}` for use in element children or as an attribute value.
pub fn jsx_translation(function: &str, key: &str) -> String {
    format!("{{{}}}", translation_call(function, key))
}

/// Syntactic guard: is `start..end` the argument of a translation call?
///
/// Looks for `t(` (optionally with an opening quote) right before the span
/// and a closing `)` right after it. This is a heuristic for the pattern
/// strategy, not a parse.
pub fn is_already_wrapped(source: &str, start: usize, end: usize) -> bool {
    let before = source[..start].trim_end();
    let before = before
        .strip_suffix(['"', '\'', '`'])
        .unwrap_or(before)
        .trim_end();
    let after = source[end..].trim_start();
    let after = after
        .strip_prefix(['"', '\'', '`'])
        .unwrap_or(after)
        .trim_start();

    let opens_call = before
        .strip_suffix('(')
        .map(str::trim_end)
        .is_some_and(|b| {
            b.strip_suffix(TRANSLATE_FN)
                .is_some_and(|rest| !rest.ends_with(|c: char| c.is_alphanumeric() || c == '_'))
        });
    opens_call && (after.starts_with(')') || after.starts_with(','))
}

/// An existing import statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportSite {
    /// Byte offset just past the statement (before its line break).
    pub end: usize,
    pub module: String,
    /// Local names bound by the `{ ... }` clause.
    pub names: Vec<String>,
    /// Offset of the closing `}` of a value import's named clause.
    pub brace_close: Option<usize>,
}

/// Import statements found by a textual scan, in source order.
pub fn scan_imports(source: &str) -> Vec<ImportSite> {
    IMPORT_REGEX
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let module = caps.get(2).or(caps.get(3)).or(caps.get(4))?;
            let mut site = ImportSite {
                end: whole.end(),
                module: module.as_str().to_string(),
                ..Default::default()
            };
            if let Some(clause) = caps.get(1) {
                named_clause(clause.as_str(), clause.start(), &mut site);
            }
            Some(site)
        })
        .collect()
}

/// Fill in the `{ a, b as c }` part of an import clause.
fn named_clause(clause: &str, offset: usize, site: &mut ImportSite) {
    let (Some(open), Some(close)) = (clause.find('{'), clause.rfind('}')) else {
        return;
    };
    if open > close {
        return;
    }

    site.names = clause[open + 1..close]
        .split(',')
        .filter_map(|spec| {
            let spec = spec.trim();
            let spec = spec.strip_prefix("type ").unwrap_or(spec).trim();
            let local = spec.rsplit_once(" as ").map_or(spec, |(_, local)| local);
            let local = local.trim();
            (!local.is_empty()).then(|| local.to_string())
        })
        .collect();

    // `import type { X }` cannot carry a value binding.
    if !clause.trim_start().starts_with("type ") {
        site.brace_close = Some(offset + close);
    }
}

/// Names from `wanted` that no import of `module` binds yet.
pub fn missing_import_names<'a>(
    imports: &[ImportSite],
    wanted: &[&'a str],
    module: &str,
) -> Vec<&'a str> {
    wanted
        .iter()
        .copied()
        .filter(|name| {
            !imports
                .iter()
                .any(|site| site.module == module && site.names.iter().any(|n| n == name))
        })
        .collect()
}

/// Modules an injected import is placed after.
pub fn is_anchor_module(module: &str, translation_module: &str) -> bool {
    module.starts_with("./")
        || module.starts_with("../")
        || module == "react"
        || module.starts_with("react-")
        || module.starts_with("react/")
        || module == "next"
        || module.starts_with("next/")
        || module == translation_module
}

/// Edit that adds `import { names } from "module";`.
///
/// Placed after the last framework or relative import, else after leading
/// directives such as `"use client"`, else at the top of the file.
pub fn import_edit(
    source: &str,
    imports: &[ImportSite],
    names: &[&str],
    translation_module: &str,
) -> TextEdit {
    let statement = format!(
        "import {{ {} }} from {};",
        names.join(", "),
        Value::String(translation_module.to_string())
    );

    if let Some(anchor) = imports
        .iter()
        .filter(|site| is_anchor_module(&site.module, translation_module))
        .map(|site| site.end)
        .max()
    {
        return TextEdit::insert(anchor, format!("\n{}", statement));
    }

    let at = DIRECTIVES_REGEX.find(source).map_or(0, |m| m.end());
    TextEdit::insert(at, format!("{}\n", statement))
}

/// Edit that brings `names` into scope from `module`.
///
/// Extends the first `import { ... } from "module"` when there is one,
/// otherwise adds a new statement via [`import_edit`].
pub fn add_import_names_edit(
    source: &str,
    imports: &[ImportSite],
    names: &[&str],
    module: &str,
) -> TextEdit {
    let Some(close) = imports
        .iter()
        .filter(|site| site.module == module)
        .find_map(|site| site.brace_close)
    else {
        return import_edit(source, imports, names, module);
    };

    let before = source[..close].trim_end();
    let list = names.join(", ");
    let text = if before.ends_with(',') || before.ends_with('{') {
        format!(" {}", list)
    } else {
        format!(", {}", list)
    };
    TextEdit::insert(before.len(), text)
}

/// `const { t } = useTranslation();`
pub fn hook_statement() -> String {
    format!("const {{ {} }} = {}();", TRANSLATE_FN, HOOK_NAME)
}

/// Insert the hook as the first statement of a block body.
///
/// `open_brace` is the offset of the body's `{`.
pub fn block_hook_edit(source: &str, open_brace: usize) -> TextEdit {
    let after = &source[open_brace + 1..];
    let indent = after
        .lines()
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(|line| {
            let end = line
                .find(|c: char| c != ' ' && c != '\t')
                .unwrap_or(line.len());
            line[..end].to_string()
        })
        .filter(|indent| !indent.is_empty())
        .unwrap_or_else(|| format!("{}  ", line_indent(source, open_brace)));

    TextEdit::insert(open_brace + 1, format!("\n{}{}", indent, hook_statement()))
}

/// Turn an arrow expression body `start..end` into a block that binds the
/// hook and returns the original expression.
pub fn expression_hook_edits(source: &str, start: usize, end: usize) -> Vec<TextEdit> {
    let base = line_indent(source, start);
    let inner = format!("{}  ", base);
    vec![
        TextEdit::insert(
            start,
            format!("{{\n{}{}\n{}return ", inner, hook_statement(), inner),
        ),
        TextEdit::insert(end, format!(";\n{}}}", base)),
    ]
}

/// `withTranslation()(Name)`
pub fn adapter_expression(component: &str) -> String {
    format!("{}()({})", ADAPTER_NAME, component)
}

/// Trailing `export default withTranslation()(Name);` for a class whose
/// `export default` prefix was removed.
pub fn adapter_export_edit(source: &str, component: &str) -> TextEdit {
    let separator = if source.ends_with('\n') { "\n" } else { "\n\n" };
    TextEdit::insert(
        source.len(),
        format!(
            "{}export default {};\n",
            separator,
            adapter_expression(component)
        ),
    )
}

/// Does a function body already acquire the translation function?
pub fn has_hook_call(body: &str) -> bool {
    body.contains(&format!("{}(", HOOK_NAME))
}
