//! Per-file component metadata.
//!
//! Inference is a cheap textual scan run once per file. It gates the
//! expensive passes (`needs_translation`) and tells the rewrite which binding
//! to inject. It may be wrong at the margins; the strategies refine it.

use std::{path::Path, sync::LazyLock};

use regex::Regex;

use crate::core::rewrite::{ADAPTER_NAME, HOOK_NAME, scan_imports};
use crate::core::strategy::pattern::scan_fragments;
use crate::core::validator::TextValidator;

static CLASS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s+(?:default\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap()
});

static COMPONENT_CLASS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*class\s+([A-Za-z_$][\w$]*)\s+extends\s+(?:React\.)?(?:Pure)?Component\b",
    )
    .unwrap()
});

static DEFAULT_EXPORT_IDENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s+default\s+([A-Za-z_$][\w$]*)\s*;?[ \t]*$").unwrap()
});

static FUNCTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*export\s+(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)",
    )
    .unwrap()
});

static ARROW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)[^=\n]*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)",
    )
    .unwrap()
});

/// How a component acquires its translation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStyle {
    /// `function Name() {}` — hook call in the body.
    Function,
    /// `const Name = () => ...` — hook call in the body.
    Arrow,
    /// `class Name extends Component` — wrapped default export.
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub style: ComponentStyle,
    pub name: String,
    pub has_binding_already: bool,
    pub needs_translation: bool,
}

impl ComponentDescriptor {
    pub fn infer(
        file_path: &str,
        content: &str,
        attributes: &[String],
        translation_module: &str,
        validator: &TextValidator,
    ) -> Self {
        let (style, name) = infer_style(content).unwrap_or_else(|| {
            let stem = Path::new(file_path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Component");
            (ComponentStyle::Function, component_name_from_stem(stem))
        });

        let has_binding_already = scan_imports(content)
            .iter()
            .any(|site| site.module == translation_module);

        let needs_translation = scan_fragments(content, attributes)
            .iter()
            .any(|fragment| validator.is_translatable(&fragment.text));

        Self {
            style,
            name,
            has_binding_already,
            needs_translation,
        }
    }

    /// The binding the main component acquires its translation function
    /// through: the hook for function styles, the adapter for classes.
    pub fn binding_name(&self) -> &'static str {
        match self.style {
            ComponentStyle::Function | ComponentStyle::Arrow => HOOK_NAME,
            ComponentStyle::Class => ADAPTER_NAME,
        }
    }
}

fn infer_style(content: &str) -> Option<(ComponentStyle, String)> {
    if let Some(caps) = CLASS_REGEX.captures(content) {
        return Some((ComponentStyle::Class, caps[1].to_string()));
    }

    let default_export = DEFAULT_EXPORT_IDENT_REGEX
        .captures(content)
        .map(|caps| caps[1].to_string());
    if let Some(caps) = COMPONENT_CLASS_REGEX
        .captures_iter(content)
        .find(|caps| default_export.as_deref() == Some(&caps[1]))
    {
        return Some((ComponentStyle::Class, caps[1].to_string()));
    }

    if let Some(caps) = FUNCTION_REGEX.captures(content) {
        return Some((ComponentStyle::Function, caps[1].to_string()));
    }

    ARROW_REGEX
        .captures(content)
        .map(|caps| (ComponentStyle::Arrow, caps[1].to_string()))
}

/// `user-profile` → `UserProfile`
fn component_name_from_stem(stem: &str) -> String {
    let name: String = stem
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect();
    if name.is_empty() {
        "Component".to_string()
    } else {
        name
    }
}
