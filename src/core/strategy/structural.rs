//! AST-based strategy.
//!
//! Files are parsed with swc. Fragments come from `JSXText` children and
//! string-valued attributes; component scopes come from the module's
//! top-level items, so boundaries are exact and nothing inside string
//! literals or comments is ever touched.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, GLOBALS, Globals, SourceMap, Span, Spanned};
use swc_ecma_ast::{
    BlockStmtOrExpr, Callee, Class, ClassExpr, Decl, DefaultDecl, Expr, FnExpr, Function,
    JSXAttr, JSXAttrName, JSXAttrValue, JSXElement, JSXElementChild, JSXElementName, JSXExpr,
    JSXFragment, MemberProp, Module, ModuleDecl, ModuleItem, Pat, Stmt, VarDecl,
};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::descriptor::ComponentDescriptor;
use crate::core::registry::KeyRegistry;
use crate::core::types::{Fragment, FragmentKind};
use crate::core::validator::TextValidator;
use crate::utils::decode_entities;

use super::scope::{
    ClassExport, ComponentScope, ScopeBody, ScopeKind, is_component_name, rewrite_in_scopes,
};
use super::{RewriteOptions, RewriteOutcome, SourceUnit, TransformStrategy};

/// Elements whose children are not UI text.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

const COMPONENT_WRAPPERS: &[&str] = &["memo", "forwardRef"];

pub struct ParsedSource {
    pub module: Module,
    /// Position of the file's first byte in the source map.
    pub start_pos: BytePos,
}

impl ParsedSource {
    /// Byte offset of `pos` in the file content.
    pub fn offset(&self, pos: BytePos) -> usize {
        (pos.0 - self.start_pos.0) as usize
    }

    fn range(&self, span: Span) -> (usize, usize) {
        (self.offset(span.lo), self.offset(span.hi))
    }
}

/// Parse JS/TS source with JSX enabled (plain `.ts` files excepted, where
/// `<T>` is a type assertion).
pub fn parse_source(code: &str, file_path: &str) -> Result<ParsedSource> {
    GLOBALS.set(&Globals::new(), || {
        let source_map = Arc::new(SourceMap::default());
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code.to_string());

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: !file_path.ends_with(".ts"),
            decorators: true,
            ..Default::default()
        });

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e))?;

        Ok(ParsedSource {
            module,
            start_pos: source_file.start_pos,
        })
    })
}

#[derive(Debug, Clone)]
pub struct StructuralStrategy {
    options: RewriteOptions,
}

impl StructuralStrategy {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }
}

impl TransformStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn fragments(&self, unit: &SourceUnit) -> Result<Vec<Fragment>> {
        let parsed = parse_source(&unit.content, &unit.path)?;
        Ok(FragmentCollector::new(&parsed, &unit.content, &self.options.attributes)
            .collect(&parsed.module))
    }

    fn rewrite(
        &self,
        unit: &SourceUnit,
        descriptor: &ComponentDescriptor,
        validator: &TextValidator,
        registry: &mut KeyRegistry,
    ) -> Result<RewriteOutcome> {
        if !descriptor.needs_translation {
            return Ok(RewriteOutcome::unchanged(&unit.content));
        }
        let parsed = parse_source(&unit.content, &unit.path)?;
        let fragments = FragmentCollector::new(&parsed, &unit.content, &self.options.attributes)
            .collect(&parsed.module);
        let scopes = ScopeCollector::new(&parsed, &descriptor.name).collect(&parsed.module);

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

/// Collects element text and designated attribute strings.
struct FragmentCollector<'a> {
    parsed: &'a ParsedSource,
    source: &'a str,
    attributes: &'a [String],
    fragments: Vec<Fragment>,
}

impl<'a> FragmentCollector<'a> {
    fn new(parsed: &'a ParsedSource, source: &'a str, attributes: &'a [String]) -> Self {
        Self {
            parsed,
            source,
            attributes,
            fragments: Vec::new(),
        }
    }

    fn collect(mut self, module: &Module) -> Vec<Fragment> {
        self.visit_module(module);
        self.fragments.sort_by_key(|f| f.start);
        self.fragments
    }

    /// Visit children; text runs next to an embedded expression belong to
    /// an interpolated sentence and are left alone.
    fn visit_children(&mut self, children: &[JSXElementChild]) {
        for (i, child) in children.iter().enumerate() {
            let JSXElementChild::JSXText(text) = child else {
                child.visit_with(self);
                continue;
            };
            let prev_is_expr = i > 0 && is_embedded_expr(&children[i - 1]);
            let next_is_expr = children.get(i + 1).is_some_and(is_embedded_expr);
            if !prev_is_expr && !next_is_expr {
                self.push_text(text.span);
            }
        }
    }

    fn push_text(&mut self, span: Span) {
        let (lo, hi) = self.parsed.range(span);
        let raw = &self.source[lo..hi];
        let text = raw.trim();
        if text.is_empty() {
            return;
        }
        let start = lo + (raw.len() - raw.trim_start().len());
        self.fragments.push(Fragment {
            text: decode_entities(text).into_owned(),
            kind: FragmentKind::ElementText,
            start,
            end: start + text.len(),
        });
    }
}

fn is_embedded_expr(child: &JSXElementChild) -> bool {
    match child {
        JSXElementChild::JSXExprContainer(container) => {
            matches!(container.expr, JSXExpr::Expr(_))
        }
        JSXElementChild::JSXSpreadChild(_) => true,
        _ => false,
    }
}

impl Visit for FragmentCollector<'_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        node.opening.visit_with(self);

        let is_raw_text = matches!(
            &node.opening.name,
            JSXElementName::Ident(ident) if RAW_TEXT_ELEMENTS.contains(&ident.sym.as_str())
        );
        if !is_raw_text {
            self.visit_children(&node.children);
        }
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        self.visit_children(&node.children);
    }

    fn visit_jsx_attr(&mut self, node: &JSXAttr) {
        let attr_name = match &node.name {
            JSXAttrName::Ident(ident) => ident.sym.to_string(),
            JSXAttrName::JSXNamespacedName(ns) => {
                format!("{}-{}", ns.ns.sym, ns.name.sym)
            }
        };
        if !self.attributes.contains(&attr_name) {
            // Expression values may still hold markup.
            node.visit_children_with(self);
            return;
        }

        match &node.value {
            Some(JSXAttrValue::Str(s)) => {
                let (start, end) = self.parsed.range(s.span);
                // The raw value between the quotes; JSX strings have no
                // backslash escapes, only character references.
                if let Some(value) = self.source.get(start + 1..end.saturating_sub(1)) {
                    self.fragments.push(Fragment {
                        text: decode_entities(value).into_owned(),
                        kind: FragmentKind::for_attribute(&attr_name),
                        start,
                        end,
                    });
                }
            }
            _ => node.visit_children_with(self),
        }
    }
}

/// Top-level components and the default export.
struct ScopeCollector<'a> {
    parsed: &'a ParsedSource,
    default_name: &'a str,
    scopes: Vec<ComponentScope>,
    /// `export default Name;` identifier span.
    default_ident: Option<(String, usize, usize)>,
}

impl<'a> ScopeCollector<'a> {
    fn new(parsed: &'a ParsedSource, default_name: &'a str) -> Self {
        Self {
            parsed,
            default_name,
            scopes: Vec::new(),
            default_ident: None,
        }
    }

    fn collect(mut self, module: &Module) -> Vec<ComponentScope> {
        for item in &module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => self.add_decl(decl),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                    self.add_decl(&export.decl)
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                    match &export.decl {
                        DefaultDecl::Fn(FnExpr { ident, function }) => {
                            let name = ident
                                .as_ref()
                                .map_or_else(|| self.default_name.to_string(), |i| i.sym.to_string());
                            self.add_function(name, function.span, function, true);
                        }
                        DefaultDecl::Class(ClassExpr {
                            ident: Some(ident),
                            class,
                        }) => {
                            let start = self.parsed.offset(export.span.lo);
                            let end = self.parsed.offset(class.span.lo);
                            self.add_class(
                                ident.sym.to_string(),
                                class,
                                ClassExport::Declaration { start, end },
                            );
                        }
                        _ => {}
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    match unwrap_component_expr(&export.expr) {
                        Expr::Ident(ident) => {
                            let (start, end) = self.parsed.range(ident.span);
                            self.default_ident = Some((ident.sym.to_string(), start, end));
                        }
                        expr => {
                            let name = self.default_name.to_string();
                            self.add_function_expr(name, export.span, expr, true);
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some((name, start, end)) = &self.default_ident {
            for scope in &mut self.scopes {
                if scope.name == *name
                    && matches!(scope.kind, ScopeKind::Class(ClassExport::Missing))
                {
                    scope.kind = ScopeKind::Class(ClassExport::Identifier {
                        start: *start,
                        end: *end,
                    });
                }
            }
        }

        self.scopes.sort_by_key(|scope| scope.start);
        self.scopes
    }

    fn add_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Fn(fn_decl) => {
                self.add_function(
                    fn_decl.ident.sym.to_string(),
                    fn_decl.function.span,
                    &fn_decl.function,
                    false,
                );
            }
            Decl::Class(class_decl) => {
                self.add_class(
                    class_decl.ident.sym.to_string(),
                    &class_decl.class,
                    ClassExport::Missing,
                );
            }
            Decl::Var(var) => self.add_var(var),
            _ => {}
        }
    }

    fn add_var(&mut self, var: &VarDecl) {
        for declarator in &var.decls {
            let (Pat::Ident(binding), Some(init)) = (&declarator.name, &declarator.init) else {
                continue;
            };
            let name = binding.id.sym.to_string();
            self.add_function_expr(name, declarator.span, unwrap_component_expr(init), false);
        }
    }

    fn add_function_expr(&mut self, name: String, span: Span, expr: &Expr, is_default: bool) {
        match expr {
            Expr::Arrow(arrow) => {
                if !is_component_name(&name) && !is_default {
                    return;
                }
                let body = match &*arrow.body {
                    BlockStmtOrExpr::BlockStmt(block) => ScopeBody::Block {
                        open_brace: self.parsed.offset(block.span.lo),
                    },
                    BlockStmtOrExpr::Expr(expr) => {
                        let (start, end) = self.parsed.range(expr.span());
                        ScopeBody::Expression { start, end }
                    }
                };
                let (start, end) = self.parsed.range(span);
                self.scopes.push(ComponentScope {
                    name,
                    start,
                    end,
                    kind: ScopeKind::Function(body),
                });
            }
            Expr::Fn(fn_expr) => self.add_function(name, span, &fn_expr.function, is_default),
            _ => {}
        }
    }

    fn add_function(&mut self, name: String, span: Span, function: &Function, is_default: bool) {
        if !is_component_name(&name) && !is_default {
            return;
        }
        let Some(body) = &function.body else {
            return;
        };
        let (start, end) = self.parsed.range(span);
        self.scopes.push(ComponentScope {
            name,
            start,
            end,
            kind: ScopeKind::Function(ScopeBody::Block {
                open_brace: self.parsed.offset(body.span.lo),
            }),
        });
    }

    fn add_class(&mut self, name: String, class: &Class, export: ClassExport) {
        let (start, end) = self.parsed.range(class.span);
        self.scopes.push(ComponentScope {
            name,
            start,
            end,
            kind: ScopeKind::Class(export),
        });
    }
}

/// Strip parentheses and `memo(...)`/`forwardRef(...)` around a component.
fn unwrap_component_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_component_expr(&paren.expr),
        Expr::Call(call) if is_component_wrapper(&call.callee) => call
            .args
            .first()
            .map_or(expr, |arg| unwrap_component_expr(&arg.expr)),
        _ => expr,
    }
}

fn is_component_wrapper(callee: &Callee) -> bool {
    let Callee::Expr(callee) = callee else {
        return false;
    };
    match &**callee {
        Expr::Ident(ident) => COMPONENT_WRAPPERS.contains(&ident.sym.as_str()),
        Expr::Member(member) => matches!(
            &member.prop,
            MemberProp::Ident(prop) if COMPONENT_WRAPPERS.contains(&prop.sym.as_str())
        ),
        _ => false,
    }
}
