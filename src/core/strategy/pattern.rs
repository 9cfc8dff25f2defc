//! Regex-based strategy for sources that cannot be parsed.
//!
//! Heuristics, in order of how they can go wrong:
//! - element text is any `>...<` run without braces or angle brackets whose
//!   `>` closes a tag (not `=>`, `->` or a comparison on the same line) and
//!   whose `<` opens one (`</`, `<x`, `<>`); tags inside a `"..."` or
//!   template literal on the same line, or written right after a quote, are
//!   string contents
//! - attribute values are matched as `name="..."` / `name='...'` only
//! - components are top-level declarations starting at column zero; their
//!   extent is found by bracket counting, which ignores string literals
//!
//! Code that slips through the first rule is left to the validator's code
//! rules.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::descriptor::ComponentDescriptor;
use crate::core::registry::KeyRegistry;
use crate::core::rewrite::is_already_wrapped;
use crate::core::types::{Fragment, FragmentKind};
use crate::core::validator::TextValidator;
use crate::utils::decode_entities;

use super::scope::{
    ClassExport, ComponentScope, ScopeBody, ScopeKind, is_component_name, rewrite_in_scopes,
};
use super::{RewriteOptions, RewriteOutcome, SourceUnit, TransformStrategy};

static TEXT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">([^<>{}]+)<").unwrap());

static RAW_TEXT_ELEMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>|<script\b[^>]*>.*?</script\s*>").unwrap()
});

static FUNCTION_DECL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(export\s+(?:default\s+)?)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)?\s*(?:<[^>(]*>)?\s*\(",
    )
    .unwrap()
});

static VARIABLE_DECL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)[^=\n]*=\s*").unwrap()
});

static CLASS_DECL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(export\s+default\s+|export\s+)?class\s+([A-Za-z_$][\w$]*)[^{]*\{").unwrap()
});

static DEFAULT_EXPORT_IDENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^export\s+default\s+([A-Za-z_$][\w$]*)\s*;?[ \t]*$").unwrap()
});

// `memo(`, `React.forwardRef(` and friends around an arrow or function.
static WRAPPER_CALL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:React\.)?(?:memo|forwardRef)\s*(?:<[^>(]*>)?\(\s*").unwrap());

static ARROW_HEAD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:async\s+)?(?:[A-Za-z_$][\w$]*|\()").unwrap());

#[derive(Debug, Clone)]
pub struct PatternStrategy {
    options: RewriteOptions,
}

impl PatternStrategy {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }
}

impl TransformStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn fragments(&self, unit: &SourceUnit) -> Result<Vec<Fragment>> {
        Ok(scan_fragments(&unit.content, &self.options.attributes))
    }

    fn rewrite(
        &self,
        unit: &SourceUnit,
        descriptor: &ComponentDescriptor,
        validator: &TextValidator,
        registry: &mut KeyRegistry,
    ) -> Result<RewriteOutcome> {
        let fragments = scan_fragments(&unit.content, &self.options.attributes);
        let scopes = scan_scopes(&unit.content, &descriptor.name);
        Ok(rewrite_in_scopes(
            unit,
            fragments,
            &scopes,
            descriptor,
            &self.options,
            validator,
            registry,
        ))
    }
}

/// Element text and designated attribute values, in source order.
pub fn scan_fragments(content: &str, attributes: &[String]) -> Vec<Fragment> {
    let raw_text: Vec<(usize, usize)> = RAW_TEXT_ELEMENT_REGEX
        .find_iter(content)
        .map(|m| (m.start(), m.end()))
        .collect();
    let in_raw_text = |offset: usize| raw_text.iter().any(|&(s, e)| s <= offset && offset < e);

    let mut fragments = Vec::new();

    for caps in TEXT_REGEX.captures_iter(content) {
        let Some(run) = caps.get(1) else { continue };
        let gt = run.start() - 1;
        let lt = run.end();
        if !closes_tag(content, gt)
            || !opens_tag(content, lt)
            || in_raw_text(run.start())
            || in_string_literal(content, gt)
            || quoted_tag(content, gt)
        {
            continue;
        }

        let raw = run.as_str();
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        let start = run.start() + (raw.len() - raw.trim_start().len());
        let end = start + text.len();
        if is_already_wrapped(content, start, end) {
            continue;
        }
        fragments.push(Fragment {
            text: decode_entities(text).into_owned(),
            kind: FragmentKind::ElementText,
            start,
            end,
        });
    }

    if let Some(attr_regex) = attribute_regex(attributes) {
        for caps in attr_regex.captures_iter(content) {
            let (Some(name), Some(value)) = (caps.get(1), caps.get(2).or(caps.get(3))) else {
                continue;
            };
            if in_raw_text(name.start()) {
                continue;
            }
            // Quotes included
            let (start, end) = (value.start() - 1, value.end() + 1);
            fragments.push(Fragment {
                text: decode_entities(value.as_str()).into_owned(),
                kind: FragmentKind::for_attribute(name.as_str()),
                start,
                end,
            });
        }
    }

    fragments.sort_by_key(|f| f.start);
    fragments
}

fn attribute_regex(attributes: &[String]) -> Option<Regex> {
    if attributes.is_empty() {
        return None;
    }
    let names: Vec<String> = attributes.iter().map(|a| regex::escape(a)).collect();
    Regex::new(&format!(
        r#"(?:^|\s)({})=(?:"([^"]*)"|'([^']*)')"#,
        names.join("|")
    ))
    .ok()
}

/// `>` at `gt` ends a tag rather than an arrow or a comparison.
fn closes_tag(content: &str, gt: usize) -> bool {
    let before = &content[..gt];
    match before.chars().next_back() {
        Some('=') | Some('-') => false,
        Some(c) if c.is_whitespace() => {
            // A `>` on its own line closes a multi-line opening tag.
            let line_start = before.rfind('\n').map_or(0, |i| i + 1);
            before[line_start..].trim().is_empty()
        }
        _ => true,
    }
}

/// `<` at `lt` starts a tag.
fn opens_tag(content: &str, lt: usize) -> bool {
    content[lt + 1..]
        .chars()
        .next()
        .is_some_and(|c| c == '/' || c == '>' || c.is_ascii_alphabetic())
}

/// Is `offset` inside a double-quoted or template string opened earlier on
/// the same line?
fn in_string_literal(content: &str, offset: usize) -> bool {
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let mut open = None;
    let mut escaped = false;
    for c in content[line_start..offset].chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match (open, c) {
            (_, '\\') => escaped = true,
            (None, '"' | '`') => open = Some(c),
            (Some(quote), c) if c == quote => open = None,
            _ => {}
        }
    }
    open.is_some()
}

/// The tag closed at `gt` starts right after a quote, as in `'<b>`.
fn quoted_tag(content: &str, gt: usize) -> bool {
    content[..gt]
        .rfind('<')
        .and_then(|lt| content[..lt].chars().next_back())
        .is_some_and(|c| matches!(c, '"' | '\'' | '`'))
}

/// Top-level components found by declaration shape.
///
/// `default_name` names an anonymous `export default function`.
pub fn scan_scopes(content: &str, default_name: &str) -> Vec<ComponentScope> {
    let mut scopes = Vec::new();

    for caps in FUNCTION_DECL_REGEX.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let is_default = caps
            .get(1)
            .is_some_and(|m| m.as_str().contains("default"));
        let name = match caps.get(2) {
            Some(name) => name.as_str().to_string(),
            None if is_default => default_name.to_string(),
            None => continue,
        };
        if !is_component_name(&name) && !is_default {
            continue;
        }
        let open_paren = whole.end() - 1;
        let Some(close_paren) = matching_close(content, open_paren) else {
            continue;
        };
        let Some(open_brace) = next_at_depth_zero(content, close_paren + 1, '{') else {
            continue;
        };
        let Some(close_brace) = matching_close(content, open_brace) else {
            continue;
        };
        scopes.push(ComponentScope {
            name,
            start: whole.start(),
            end: close_brace + 1,
            kind: ScopeKind::Function(ScopeBody::Block { open_brace }),
        });
    }

    for caps in VARIABLE_DECL_REGEX.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !is_component_name(name.as_str()) {
            continue;
        }
        if let Some((body, end)) = arrow_or_function_body(content, whole.end()) {
            scopes.push(ComponentScope {
                name: name.as_str().to_string(),
                start: whole.start(),
                end,
                kind: ScopeKind::Function(body),
            });
        }
    }

    let default_ident = DEFAULT_EXPORT_IDENT_REGEX
        .captures(content)
        .and_then(|caps| caps.get(1));
    for caps in CLASS_DECL_REGEX.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let open_brace = whole.end() - 1;
        let Some(close_brace) = matching_close(content, open_brace) else {
            continue;
        };
        let export = match caps.get(1) {
            Some(prefix) if prefix.as_str().contains("default") => ClassExport::Declaration {
                start: prefix.start(),
                end: prefix.end(),
            },
            _ => match default_ident {
                Some(ident) if ident.as_str() == name.as_str() => ClassExport::Identifier {
                    start: ident.start(),
                    end: ident.end(),
                },
                _ => ClassExport::Missing,
            },
        };
        scopes.push(ComponentScope {
            name: name.as_str().to_string(),
            start: whole.start(),
            end: close_brace + 1,
            kind: ScopeKind::Class(export),
        });
    }

    scopes.sort_by_key(|scope| scope.start);
    scopes
}

/// Body of the function value starting at `at` (after `=`), unwrapping
/// `memo(...)`/`forwardRef(...)`. Returns the body and the end of the value.
fn arrow_or_function_body(content: &str, at: usize) -> Option<(ScopeBody, usize)> {
    let mut at = at;
    if let Some(wrapper) = WRAPPER_CALL_REGEX.find(&content[at..]) {
        at += wrapper.end();
    }
    let rest = &content[at..];

    if let Some(after_function) = rest
        .strip_prefix("function")
        .or_else(|| rest.strip_prefix("async function"))
    {
        let offset = at + (rest.len() - after_function.len());
        let open_paren = offset + content[offset..].find('(')?;
        let close_paren = matching_close(content, open_paren)?;
        let open_brace = next_at_depth_zero(content, close_paren + 1, '{')?;
        let close_brace = matching_close(content, open_brace)?;
        return Some((ScopeBody::Block { open_brace }, close_brace + 1));
    }

    let head = ARROW_HEAD_REGEX.find(rest)?;
    let mut cursor = at + head.end();
    if head.as_str().ends_with('(') {
        cursor = matching_close(content, cursor - 1)? + 1;
    }
    let arrow = cursor + content[cursor..].find("=>")?;
    // Only whitespace or a return type annotation between params and `=>`.
    let between = content[cursor..arrow].trim();
    if !between.is_empty() && !between.starts_with(':') {
        return None;
    }

    let body_start = arrow + 2 + leading_whitespace(&content[arrow + 2..]);
    match content[body_start..].chars().next()? {
        '{' => {
            let close_brace = matching_close(content, body_start)?;
            Some((
                ScopeBody::Block {
                    open_brace: body_start,
                },
                close_brace + 1,
            ))
        }
        '(' => {
            let close = matching_close(content, body_start)?;
            Some((
                ScopeBody::Expression {
                    start: body_start,
                    end: close + 1,
                },
                close + 1,
            ))
        }
        _ => {
            let end = expression_end(content, body_start);
            (end > body_start).then_some((
                ScopeBody::Expression {
                    start: body_start,
                    end,
                },
                end,
            ))
        }
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

/// Offset of the bracket closing the one at `open`.
fn matching_close(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let (open_ch, close_ch) = match bytes.get(open)? {
        b'(' => (b'(', b')'),
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// First `target` at bracket depth zero from `from`, stopping at `;`.
fn next_at_depth_zero(content: &str, from: usize, target: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in content[from..].char_indices() {
        match c {
            _ if c == target && depth == 0 => return Some(from + i),
            '(' | '[' | '<' => depth += 1,
            ')' | ']' | '>' => depth -= 1,
            ';' if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

/// End of an unparenthesized expression: the first `;` or line break at
/// bracket depth zero, trailing whitespace excluded.
fn expression_end(content: &str, start: usize) -> usize {
    let mut depth = 0i32;
    let mut end = content.len();
    for (i, c) in content[start..].char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    end = start + i;
                    break;
                }
                depth -= 1;
            }
            ';' | '\n' if depth == 0 => {
                end = start + i;
                break;
            }
            _ => {}
        }
    }
    start + content[start..end].trim_end().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;

    fn attributes() -> Vec<String> {
        Config::default().attributes
    }

    fn texts(content: &str) -> Vec<String> {
        scan_fragments(content, &attributes())
            .into_iter()
            .map(|f| f.text)
            .collect()
    }

    fn rewrite(content: &str) -> (RewriteOutcome, KeyRegistry) {
        let config = Config::default();
        let (validator, _) = TextValidator::new(&config);
        let mut registry = KeyRegistry::new(config.key_strategy);
        let strategy = PatternStrategy::new(RewriteOptions::from(&config));
        let unit = SourceUnit::new("src/App.jsx", content);
        let descriptor = ComponentDescriptor::infer(
            &unit.path,
            content,
            &config.attributes,
            &config.translation_module,
            &validator,
        );
        let outcome = strategy
            .rewrite(&unit, &descriptor, &validator, &mut registry)
            .unwrap();
        (outcome, registry)
    }

    #[test]
    fn test_scan_text_and_attributes() {
        let content = r#"<div><h1>Welcome</h1><input placeholder="Enter email" /></div>"#;
        let fragments = scan_fragments(content, &attributes());
        assert_eq!(fragments.len(), 2);

        assert_eq!(fragments[0].text, "Welcome");
        assert_eq!(fragments[0].kind, FragmentKind::ElementText);
        assert_eq!(&content[fragments[0].start..fragments[0].end], "Welcome");

        assert_eq!(fragments[1].text, "Enter email");
        assert_eq!(fragments[1].kind, FragmentKind::PlaceholderAttribute);
        assert_eq!(
            &content[fragments[1].start..fragments[1].end],
            "\"Enter email\""
        );
    }

    #[test]
    fn test_scan_skips_expression_neighbours() {
        assert_eq!(texts("<p>Hello {name}</p>"), Vec::<String>::new());
        assert_eq!(texts("<p>{count} items</p>"), Vec::<String>::new());
        assert_eq!(texts("<p>{t(\"Welcome\")}</p>"), Vec::<String>::new());
    }

    #[test]
    fn test_scan_skips_arrows_and_comparisons() {
        let content = "const f = () => a < b;\nif (x > y && y < z) {}\nconst g = (a) -> b < c;";
        assert_eq!(texts(content), Vec::<String>::new());
    }

    #[test]
    fn test_scan_multiline_opening_tag() {
        let content = "<button\n  className=\"primary\"\n>\n  Save changes\n</button>";
        assert_eq!(texts(content), vec!["Save changes"]);
    }

    #[test]
    fn test_scan_ignores_style_and_script() {
        let content = "<style>{`.a { color: red }`}</style><script>var label = 'x';</script><style>body a</style><p>Shown text</p>";
        assert_eq!(texts(content), vec!["Shown text"]);
    }

    #[test]
    fn test_scan_single_quoted_and_aria_attributes() {
        let content = "<img alt='Company logo' aria-label=\"Logo\" data-title=\"nope\" />";
        let fragments = scan_fragments(content, &attributes());
        let texts: Vec<_> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Company logo", "Logo"]);
        assert!(fragments.iter().all(|f| f.kind == FragmentKind::LabelAttribute));
    }

    #[test]
    fn test_scopes_for_common_declarations() {
        let content = r#"export default function () {
  return <p>Anonymous</p>;
}
export function Header() {
  return <h1>Header</h1>;
}
const Card = ({ title }) => (
  <div>{title}</div>
);
const Badge = memo(() => <span>New</span>);
function helper() {
  return 1;
}
export default class Page extends Component {
  render() { return <p>Page</p>; }
}
"#;
        let scopes = scan_scopes(content, "Home");
        let names: Vec<_> = scopes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Header", "Card", "Badge", "Page"]);

        let badge = &scopes[3];
        let ScopeKind::Function(ScopeBody::Expression { start, end }) = badge.kind else {
            panic!("expected expression body, got {:?}", badge.kind);
        };
        assert_eq!(&content[start..end], "<span>New</span>");

        assert!(matches!(
            scopes[4].kind,
            ScopeKind::Class(ClassExport::Declaration { .. })
        ));
    }

    #[test]
    fn test_rewrite_function_component() {
        let content = r#"import React from "react";

export function Login() {
  return (
    <form>
      <h1>Welcome</h1>
      <input placeholder="Enter email" />
    </form>
  );
}
"#;
        let (outcome, registry) = rewrite(content);
        assert_eq!(
            outcome.content,
            r#"import React from "react";
import { useTranslation } from "react-i18next";

export function Login() {
  const { t } = useTranslation();
  return (
    <form>
      <h1>{t("Welcome")}</h1>
      <input placeholder={t("Enter email")} />
    </form>
  );
}
"#
        );
        assert_eq!(outcome.replacements, 2);
        assert_eq!(outcome.hooks_added, 1);
        assert!(outcome.import_added);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_rewrite_arrow_expression_body() {
        let content = "const Greeting = () => (\n  <p>Good morning</p>\n);\n\nexport default Greeting;\n";
        let (outcome, _) = rewrite(content);
        assert_eq!(
            outcome.content,
            "import { useTranslation } from \"react-i18next\";\nconst Greeting = () => {\n  const { t } = useTranslation();\n  return (\n  <p>{t(\"Good morning\")}</p>\n);\n};\n\nexport default Greeting;\n"
        );
    }

    #[test]
    fn test_rewrite_class_component() {
        let content = r#"import React, { Component } from "react";

export default class Profile extends Component {
  render() {
    return <h2>Your profile</h2>;
  }
}
"#;
        let (outcome, _) = rewrite(content);
        assert_eq!(
            outcome.content,
            r#"import React, { Component } from "react";
import { withTranslation } from "react-i18next";

class Profile extends Component {
  render() {
    return <h2>{this.props.t("Your profile")}</h2>;
  }
}

export default withTranslation()(Profile);
"#
        );
        assert_eq!(outcome.adapters_added, 1);
        assert_eq!(outcome.hooks_added, 0);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let content = "export function A() {\n  return <p>Hello there</p>;\n}\n";
        let (first, _) = rewrite(content);
        assert!(first.changed());
        let (second, _) = rewrite(&first.content);
        assert!(!second.changed());
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn test_rewrite_skips_markup_in_string_literals() {
        let content = r#"export function Card() {
  const html = "<b>Bold text</b>";
  return <div className="card">Card body</div>;
}
"#;
        let (outcome, registry) = rewrite(content);
        assert_eq!(
            outcome.content,
            r#"import { useTranslation } from "react-i18next";
export function Card() {
  const { t } = useTranslation();
  const html = "<b>Bold text</b>";
  return <div className="card">{t("Card body")}</div>;
}
"#
        );
        assert_eq!(outcome.replacements, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rewrite_skips_single_quoted_markup() {
        let content = "export function Note() {\n  const tip = '<i>Tip</i>';\n  return <p>Read the docs</p>;\n}\n";
        let (outcome, _) = rewrite(content);
        assert_eq!(outcome.replacements, 1);
        assert!(outcome.content.contains("const tip = '<i>Tip</i>';\n"));
        assert!(outcome.content.contains("<p>{t(\"Read the docs\")}</p>"));
    }

    #[test]
    fn test_rewrite_decodes_entities() {
        let content = "export function Terms() {\n  return <p>Terms &amp; conditions</p>;\n}\n";
        let (outcome, registry) = rewrite(content);
        assert!(outcome.content.contains("<p>{t(\"Terms & conditions\")}</p>"));
        assert_eq!(registry.get("Terms & conditions"), Some("Terms & conditions"));
    }

    #[test]
    fn test_rewrite_extends_existing_translation_import() {
        let content = "import { Trans } from 'react-i18next';\n\nexport function Header() {\n  return <h1>Site header</h1>;\n}\n";
        let (outcome, _) = rewrite(content);
        assert!(
            outcome
                .content
                .starts_with("import { Trans, useTranslation } from 'react-i18next';\n")
        );
        assert_eq!(outcome.hooks_added, 1);
    }

    #[test]
    fn test_component_with_local_t_is_left_alone() {
        let content = r#"export function List({ items }) {
  return <ul>{items.map(t => <li key={t.id}>{t.name}</li>)}<li>More items</li></ul>;
}
"#;
        let (outcome, registry) = rewrite(content);
        assert!(!outcome.changed());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("local `t`"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_markup_outside_components_is_left_alone() {
        let content = "function renderRow() {\n  return <td>Row label</td>;\n}\n";
        let (outcome, registry) = rewrite(content);
        assert!(!outcome.changed());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("Row label"));
        assert!(registry.is_empty());
    }
}
