//! Classification of candidate text fragments.
//!
//! A fragment is translatable unless one of the ordered checks in
//! [`TextValidator::classify`] rejects it. The first rejecting check wins.
//! Rules of [`Severity::Warn`] and [`Severity::Info`] never reject; they only
//! show up in [`TextValidator::detailed_report`].

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    fmt,
    sync::LazyLock,
};

use regex::Regex;

use crate::config::Config;
use crate::utils::contains_alphabetic;

/// Tokens that look like words but are code, never UI copy.
const TECHNICAL_TERMS: &[&str] = &[
    // boolean-like / literals
    "true", "false", "null", "undefined", "nan", "none",
    // css-like
    "auto", "inherit", "initial", "unset", "flex", "block", "inline", "inline-block", "grid",
    "absolute", "relative", "sticky", "solid", "dashed", "transparent", "pointer", "nowrap",
    "uppercase", "lowercase",
    // http methods
    "get", "post", "put", "patch", "delete", "head",
    // framework keywords
    "props", "state", "children", "key", "ref", "classname", "onclick", "onchange", "onsubmit",
    "usestate", "useeffect", "usememo", "usecallback", "useref", "div", "span", "button",
    "input", "svg", "json", "utf-8", "px", "em", "rem",
];

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?(?:\d+(?:[.,]\d+)*|\.\d+)$").unwrap());

static PATH_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\./|\.\./|/|[A-Za-z]:[\\/]|https?://|www\.)").unwrap()
});

// Whitespace-free token ending in a short alphabetic extension: "logo.png"
static FILE_EXTENSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+\.[A-Za-z]{1,5}$").unwrap());

static UTILITY_CLASS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-z]+:)*-?(?:bg|text|font|flex|grid|gap|p|px|py|pt|pb|pl|pr|m|mx|my|mt|mb|ml|mr|w|h|min-w|min-h|max-w|max-h|border|rounded|shadow|items|justify|self|place|space-x|space-y|z|top|left|right|bottom|inset|opacity|col|row|leading|tracking|overflow|ring|transition|duration|ease)-[\w./\[\]#%-]+$",
    )
    .unwrap()
});

/// Rule outcome severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Reject,
    Warn,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "reject"),
            Severity::Warn => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A named predicate over fragment text.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    pub name: &'static str,
    pub description: &'static str,
    pub pattern: Regex,
    pub severity: Severity,
}

impl ValidationRule {
    fn new(
        name: &'static str,
        description: &'static str,
        pattern: &str,
        severity: Severity,
    ) -> Self {
        Self {
            name,
            description,
            // Built-in patterns are constants covered by tests.
            pattern: Regex::new(pattern).unwrap(),
            severity,
        }
    }
}

static DEFAULT_RULES: LazyLock<Vec<ValidationRule>> = LazyLock::new(|| {
    vec![
        ValidationRule::new(
            "code-concatenation",
            "string concatenation with code",
            r#"["'`]\s*\+|\+\s*["'`]|\+\s*[A-Za-z_$][\w$]*\s*\+"#,
            Severity::Reject,
        ),
        ValidationRule::new(
            "conditional-expression",
            "ternary or logical expression",
            r"\?\s*[^?:]+\s:\s|&&|\|\||\?\?",
            Severity::Reject,
        ),
        ValidationRule::new(
            "code-punctuation",
            "statement or arrow function syntax",
            r#"=>|===|!==|;\s*$|^\s*;|["'`]\s*;|;\s*\n\s*(?:return|const|let|var|if|for|while|function|export|import)\b|[A-Za-z_$][\w$]*\(\s*["'`)]"#,
            Severity::Reject,
        ),
        ValidationRule::new(
            "markup-or-braces",
            "embedded braces or angle brackets",
            r"[{}<>]",
            Severity::Reject,
        ),
        ValidationRule::new(
            "reserved-keyword",
            "looks like a code statement",
            r"^(?:(?:const|let|var)\s+[\w$]+\s*=|function\s*[\w$]*\s*\(|(?:import|export)\s+.*\bfrom\b|return\s+[\w$.]+\s*;|typeof\s+[\w$]+|new\s+[A-Z][\w$]*\()",
            Severity::Reject,
        ),
        ValidationRule::new(
            "css-unit",
            "css length or duration value",
            r"^-?\d*\.?\d+\s*(?:px|em|rem|vh|vw|vmin|vmax|%|pt|pc|cm|mm|in|ex|ch|ms|s|deg|fr)$",
            Severity::Reject,
        ),
        ValidationRule::new(
            "long-text",
            "long text, consider splitting into several keys",
            r"^[\s\S]{120,}$",
            Severity::Warn,
        ),
        ValidationRule::new(
            "html-entity",
            "contains an HTML entity",
            r"&(?:[a-zA-Z]+|#\d+);",
            Severity::Warn,
        ),
        ValidationRule::new(
            "all-caps",
            "all upper-case text, may be an identifier",
            r"^[A-Z][A-Z0-9_]{2,}$",
            Severity::Warn,
        ),
        ValidationRule::new(
            "single-word",
            "single word",
            r"^\S+$",
            Severity::Info,
        ),
        ValidationRule::new(
            "trailing-colon",
            "ends with a colon, likely a label",
            r":\s*$",
            Severity::Info,
        ),
    ]
});

/// Why a fragment was rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    Empty,
    Length,
    TechnicalTerm,
    Numeric,
    PathOrUrl,
    Rule(&'static str),
    UtilityClass,
    CustomPattern,
    NoAlphabetic,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Empty => write!(f, "empty"),
            RejectReason::Length => write!(f, "length out of bounds"),
            RejectReason::TechnicalTerm => write!(f, "technical term"),
            RejectReason::Numeric => write!(f, "numeric"),
            RejectReason::PathOrUrl => write!(f, "path or url"),
            RejectReason::Rule(name) => write!(f, "{}", name),
            RejectReason::UtilityClass => write!(f, "utility class names"),
            RejectReason::CustomPattern => write!(f, "custom skip pattern"),
            RejectReason::NoAlphabetic => write!(f, "no alphabetic characters"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// A non-rejecting rule that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

/// Full diagnostic view of one fragment.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub text: String,
    pub verdict: Verdict,
    pub hits: Vec<RuleHit>,
}

impl ValidationReport {
    pub fn warnings(&self) -> impl Iterator<Item = &RuleHit> {
        self.hits.iter().filter(|h| h.severity == Severity::Warn)
    }

    pub fn infos(&self) -> impl Iterator<Item = &RuleHit> {
        self.hits.iter().filter(|h| h.severity == Severity::Info)
    }
}

pub struct TextValidator {
    min_length: usize,
    max_length: usize,
    technical_terms: HashSet<&'static str>,
    custom_patterns: Vec<Regex>,
    rejections: RefCell<BTreeMap<RejectReason, usize>>,
}

impl TextValidator {
    /// Build a validator from the config.
    ///
    /// Returns the validator plus one warning per custom pattern that failed
    /// to compile; such patterns are dropped for the run.
    pub fn new(config: &Config) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let custom_patterns = config
            .skip_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warnings.push(format!("Ignoring invalid skip pattern '{}': {}", pattern, e));
                    None
                }
            })
            .collect();

        let validator = Self {
            min_length: config.min_length,
            max_length: config.max_length,
            technical_terms: TECHNICAL_TERMS.iter().copied().collect(),
            custom_patterns,
            rejections: RefCell::new(BTreeMap::new()),
        };
        (validator, warnings)
    }

    pub fn classify(&self, text: &str) -> Verdict {
        let verdict = self.evaluate(text);
        if let Verdict::Reject(reason) = &verdict {
            *self.rejections.borrow_mut().entry(reason.clone()).or_default() += 1;
        }
        verdict
    }

    /// Same verdict as [`classify`](Self::classify) without touching the
    /// rejection counters. Used by pre-checks that must not skew diagnostics.
    pub fn is_translatable(&self, text: &str) -> bool {
        self.evaluate(text).is_accept()
    }

    /// Rejection counts per reason since construction.
    pub fn rejection_counts(&self) -> BTreeMap<RejectReason, usize> {
        self.rejections.borrow().clone()
    }

    /// Verdict plus every warning/info rule that matches. Does not touch the
    /// rejection counters.
    pub fn detailed_report(&self, text: &str) -> ValidationReport {
        let trimmed = text.trim();
        let hits = DEFAULT_RULES
            .iter()
            .filter(|rule| rule.severity != Severity::Reject && rule.pattern.is_match(trimmed))
            .map(|rule| RuleHit {
                name: rule.name,
                description: rule.description,
                severity: rule.severity,
            })
            .collect();

        ValidationReport {
            text: trimmed.to_string(),
            verdict: self.evaluate(text),
            hits,
        }
    }

    fn evaluate(&self, text: &str) -> Verdict {
        let text = text.trim();
        if text.is_empty() {
            return Verdict::Reject(RejectReason::Empty);
        }

        let len = text.chars().count();
        if len < self.min_length || len > self.max_length {
            return Verdict::Reject(RejectReason::Length);
        }

        if self.technical_terms.contains(text.to_lowercase().as_str()) {
            return Verdict::Reject(RejectReason::TechnicalTerm);
        }

        if NUMERIC_REGEX.is_match(text) {
            return Verdict::Reject(RejectReason::Numeric);
        }

        if is_path_like(text) {
            return Verdict::Reject(RejectReason::PathOrUrl);
        }

        if let Some(rule) = DEFAULT_RULES
            .iter()
            .find(|rule| rule.severity == Severity::Reject && rule.pattern.is_match(text))
        {
            return Verdict::Reject(RejectReason::Rule(rule.name));
        }

        if text.split_whitespace().all(|token| UTILITY_CLASS_REGEX.is_match(token)) {
            return Verdict::Reject(RejectReason::UtilityClass);
        }

        if self.custom_patterns.iter().any(|re| re.is_match(text)) {
            return Verdict::Reject(RejectReason::CustomPattern);
        }

        if !contains_alphabetic(text) {
            return Verdict::Reject(RejectReason::NoAlphabetic);
        }

        Verdict::Accept
    }
}

fn is_path_like(text: &str) -> bool {
    if PATH_PREFIX_REGEX.is_match(text) {
        return true;
    }
    let has_whitespace = text.chars().any(char::is_whitespace);
    (text.contains('/') && !has_whitespace) || FILE_EXTENSION_REGEX.is_match(text)
}
