//! Component scopes and the edit planner shared by both strategies.
//!
//! A strategy locates fragments and the top-level components that own them.
//! [`rewrite_in_scopes`] turns that into text edits: translation calls, the
//! hook or adapter each touched component needs, and the import names those
//! bindings use that the file does not import yet.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use tracing::debug;

use crate::core::descriptor::ComponentDescriptor;
use crate::core::registry::KeyRegistry;
use crate::core::rewrite::{
    ADAPTER_NAME, CLASS_TRANSLATE_FN, HOOK_NAME, TRANSLATE_FN, TextEdit, adapter_expression,
    adapter_export_edit, add_import_names_edit, apply_edits, block_hook_edit,
    expression_hook_edits, has_hook_call, is_already_wrapped, jsx_translation,
    missing_import_names, scan_imports,
};
use crate::core::types::Fragment;
use crate::core::validator::TextValidator;
use crate::utils::LineIndex;

use super::{RewriteOptions, RewriteOutcome, SourceUnit};

// Declarations, parameters and destructured names called `t`.
static LOCAL_T_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:const|let|var|function)\s+t\b|\bt\s*=>|[(,{]\s*t\s*[,)}]").unwrap()
});

/// Body of a function component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeBody {
    /// Offset of the opening `{`.
    Block { open_brace: usize },
    /// Arrow expression body, `start..end`.
    Expression { start: usize, end: usize },
}

/// How a class component reaches the module's default export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassExport {
    /// `export default class Name`; `start..end` covers `export default `.
    Declaration { start: usize, end: usize },
    /// `export default Name;`; `start..end` covers `Name`.
    Identifier { start: usize, end: usize },
    /// Not default-exported, so it cannot be wrapped.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Function(ScopeBody),
    Class(ClassExport),
}

/// A top-level component and the byte range it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentScope {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub kind: ScopeKind,
}

impl ComponentScope {
    fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// React components are PascalCase; lower-case functions are helpers and
/// must not receive a hook call.
pub fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Would an injected `const { t }` collide with a `t` the component
/// already binds?
pub fn binds_local_t(body: &str) -> bool {
    LOCAL_T_REGEX.is_match(body)
}

/// Rewrite every translatable fragment that sits inside a component scope.
pub fn rewrite_in_scopes(
    unit: &SourceUnit,
    fragments: Vec<Fragment>,
    scopes: &[ComponentScope],
    descriptor: &ComponentDescriptor,
    options: &RewriteOptions,
    validator: &TextValidator,
    registry: &mut KeyRegistry,
) -> RewriteOutcome {
    let source = unit.content.as_str();
    let mut outcome = RewriteOutcome::unchanged(source);
    if !descriptor.needs_translation {
        return outcome;
    }

    let lines = LineIndex::new(source);
    let mut edits = Vec::new();
    let mut touched = BTreeSet::new();
    let mut shadowed = BTreeSet::new();

    for fragment in fragments {
        if !validator.is_translatable(&fragment.text)
            || is_already_wrapped(source, fragment.start, fragment.end)
        {
            continue;
        }

        let Some((index, scope)) = scopes
            .iter()
            .enumerate()
            .filter(|(_, scope)| scope.contains(fragment.start))
            .min_by_key(|(_, scope)| scope.end - scope.start)
        else {
            let (line, col) = lines.position(source, fragment.start);
            outcome.warnings.push(format!(
                "{}:{}:{}: \"{}\" is outside any component, left as is",
                unit.path, line, col, fragment.text
            ));
            continue;
        };

        if matches!(scope.kind, ScopeKind::Function(_)) {
            if shadowed.contains(&index) {
                continue;
            }
            let body = &source[scope.start..scope.end];
            if options.inject_hooks && !has_hook_call(body) && binds_local_t(body) {
                let (line, col) = lines.position(source, fragment.start);
                outcome.warnings.push(format!(
                    "{}:{}:{}: component {} already has a local `t`, left as is",
                    unit.path, line, col, scope.name
                ));
                shadowed.insert(index);
                continue;
            }
        }

        let function = match scope.kind {
            ScopeKind::Function(_) => TRANSLATE_FN,
            ScopeKind::Class(_) if !options.class_components => {
                let (line, col) = lines.position(source, fragment.start);
                outcome.warnings.push(format!(
                    "{}:{}:{}: \"{}\" is in class component {}, class support is disabled",
                    unit.path, line, col, fragment.text, scope.name
                ));
                continue;
            }
            ScopeKind::Class(ClassExport::Missing) => {
                let (line, col) = lines.position(source, fragment.start);
                outcome.warnings.push(format!(
                    "{}:{}:{}: \"{}\" is in class component {}, which is not the default export",
                    unit.path, line, col, fragment.text, scope.name
                ));
                continue;
            }
            ScopeKind::Class(_) => CLASS_TRANSLATE_FN,
        };

        // Registered keys are reused without counting a second duplicate.
        let existing = registry.get(&fragment.text).map(str::to_string);
        let key = match existing {
            Some(key) => key,
            None => registry.resolve(&fragment.text),
        };

        edits.push(TextEdit::replace(
            fragment.start,
            fragment.end,
            jsx_translation(function, &key),
        ));
        outcome.replacements += 1;
        touched.insert(index);
    }

    let mut import_names = Vec::new();
    for index in touched {
        let scope = &scopes[index];
        match scope.kind {
            ScopeKind::Function(body) => {
                if !options.inject_hooks || has_hook_call(&source[scope.start..scope.end]) {
                    continue;
                }
                match body {
                    ScopeBody::Block { open_brace } => {
                        edits.push(block_hook_edit(source, open_brace));
                    }
                    ScopeBody::Expression { start, end } => {
                        edits.extend(expression_hook_edits(source, start, end));
                    }
                }
                outcome.hooks_added += 1;
                if !import_names.contains(&HOOK_NAME) {
                    import_names.push(HOOK_NAME);
                }
            }
            ScopeKind::Class(export) => {
                if source.contains(&format!("{}(", ADAPTER_NAME)) {
                    continue;
                }
                match export {
                    ClassExport::Declaration { start, end } => {
                        edits.push(TextEdit::replace(start, end, ""));
                        edits.push(adapter_export_edit(source, &scope.name));
                    }
                    ClassExport::Identifier { start, end } => {
                        edits.push(TextEdit::replace(
                            start,
                            end,
                            adapter_expression(&scope.name),
                        ));
                    }
                    ClassExport::Missing => continue,
                }
                outcome.adapters_added += 1;
                if !import_names.contains(&ADAPTER_NAME) {
                    import_names.push(ADAPTER_NAME);
                }
            }
        }
    }

    if !import_names.is_empty() {
        // The file's main component gets its binding listed first.
        let primary = descriptor.binding_name();
        import_names.sort_unstable_by_key(|name| *name != primary);
        if let Some(scope) = scopes.iter().find(|scope| scope.name == descriptor.name) {
            let scope_binding = match scope.kind {
                ScopeKind::Function(_) => HOOK_NAME,
                ScopeKind::Class(_) => ADAPTER_NAME,
            };
            if scope_binding != primary {
                debug!(
                    file = %unit.path,
                    component = %scope.name,
                    "descriptor expected {}, scope needs {}",
                    primary,
                    scope_binding
                );
            }
        }

        let imports = scan_imports(source);
        let names = if descriptor.has_binding_already {
            missing_import_names(&imports, &import_names, &options.translation_module)
        } else {
            import_names
        };
        if !names.is_empty() {
            edits.push(add_import_names_edit(
                source,
                &imports,
                &names,
                &options.translation_module,
            ));
            outcome.import_added = true;
        }
    }

    if !edits.is_empty() {
        outcome.content = apply_edits(source, edits);
    }
    outcome
}
