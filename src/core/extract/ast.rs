//! Syntax-tree extraction using swc.
//!
//! Accessor bindings are tracked per lexical scope, so a parameter or local
//! that reuses an accessor's name (e.g. `items.map((t) => t.name)`) never
//! attributes keys to the outer namespace.

use std::sync::Arc;

use anyhow::Result;
use swc_common::SourceMap;
use swc_ecma_ast::{
    ArrowExpr, CallExpr, Callee, ExportAll, Expr, Function, ImportDecl, Lit, MemberProp,
    NamedExport, ObjectPatProp, Pat, Prop, PropName, PropOrSpread, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::{
    AccessorSite, BindingContext, ExtractorOptions, FileExtraction, KEY_METHODS, KeyExtractor,
    NamespaceArg, NamespaceBinding,
};
use crate::core::parsers::jsx::parse_jsx_source;

pub struct AstExtractor {
    options: ExtractorOptions,
}

impl AstExtractor {
    pub fn new(options: ExtractorOptions) -> Self {
        Self { options }
    }
}

impl KeyExtractor for AstExtractor {
    fn extract(&self, source: &str, file_name: &str) -> Result<FileExtraction> {
        let parsed = parse_jsx_source(source.to_string(), file_name, Arc::default())?;
        let mut visitor = AccessorVisitor::new(&self.options, &parsed.source_map);
        parsed.module.visit_with(&mut visitor);
        Ok(visitor.result)
    }
}

struct AccessorVisitor<'a> {
    options: &'a ExtractorOptions,
    source_map: &'a SourceMap,
    bindings: BindingContext,
    result: FileExtraction,
}

impl<'a> AccessorVisitor<'a> {
    fn new(options: &'a ExtractorOptions, source_map: &'a SourceMap) -> Self {
        Self {
            options,
            source_map,
            bindings: BindingContext::new(),
            result: FileExtraction::default(),
        }
    }

    fn shadow_pat(&mut self, pat: &Pat) {
        for name in extract_binding_names(pat) {
            self.bindings.shadow(&name);
        }
    }

    /// Record the literal first argument of a call through a bound accessor.
    fn record_key(&mut self, namespace: String, call: &CallExpr) {
        if let Some(arg) = call.args.first()
            && arg.spread.is_none()
            && let Some(key) = literal_string(&arg.expr)
        {
            self.result.keys.insert(namespace, key);
        }
    }

    fn push_import(&mut self, specifier: &str) {
        self.result
            .push_import(specifier, &self.options.import_filter);
    }
}

impl Visit for AccessorVisitor<'_> {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        if let Some(specifier) = node.src.value.as_str() {
            self.push_import(specifier);
        }
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        if let Some(src) = &node.src
            && let Some(specifier) = src.value.as_str()
        {
            self.push_import(specifier);
        }
    }

    fn visit_export_all(&mut self, node: &ExportAll) {
        if let Some(specifier) = node.src.value.as_str() {
            self.push_import(specifier);
        }
    }

    fn visit_function(&mut self, node: &Function) {
        self.bindings.enter_scope();
        for param in &node.params {
            self.shadow_pat(&param.pat);
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.bindings.enter_scope();
        for param in &node.params {
            self.shadow_pat(param);
        }
        node.visit_children_with(self);
        self.bindings.exit_scope();
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        for decl in &node.decls {
            let mut registered = false;

            if let Some(init) = &decl.init
                && let Some(call) = unwrap_call(init)
                && let Callee::Expr(callee) = &call.callee
                && let Expr::Ident(ident) = &**callee
                && let Some(origin) = self.options.accessors.origin_of(ident.sym.as_str())
                && let Pat::Ident(binding_ident) = &decl.name
                && let NamespaceArg::Literal(namespace) = namespace_arg(call)
            {
                let local_name = binding_ident.id.sym.to_string();
                self.bindings
                    .bind_accessor(local_name.clone(), namespace.clone());
                self.result.bindings.push(NamespaceBinding {
                    local_name,
                    namespace,
                    origin,
                });
                registered = true;
            }

            if !registered {
                self.shadow_pat(&decl.name);
            }

            decl.visit_children_with(self);
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        match &node.callee {
            Callee::Expr(expr) => match &**expr {
                Expr::Ident(ident) => {
                    let name = ident.sym.as_str();

                    if let Some(origin) = self.options.accessors.origin_of(name) {
                        let loc = self.source_map.lookup_char_pos(ident.span.lo);
                        self.result.accessors.push(AccessorSite {
                            accessor: name.to_string(),
                            namespace: namespace_arg(node),
                            origin,
                            line: loc.line,
                            col: loc.col_display + 1,
                        });
                    }

                    if let Some(namespace) = self.bindings.namespace_of(name).map(str::to_string) {
                        self.record_key(namespace, node);
                    }
                }
                // t.raw("key"), t.rich("key"), t.has("key"), t.markup("key")
                Expr::Member(member) => {
                    if let Expr::Ident(obj_ident) = &*member.obj
                        && let MemberProp::Ident(method_ident) = &member.prop
                        && KEY_METHODS.contains(&method_ident.sym.as_str())
                        && let Some(namespace) = self
                            .bindings
                            .namespace_of(obj_ident.sym.as_str())
                            .map(str::to_string)
                    {
                        self.record_key(namespace, node);
                    }
                }
                _ => {}
            },
            // import("./Lazy")
            Callee::Import(_) => {
                if let Some(arg) = node.args.first()
                    && let Some(specifier) = literal_string(&arg.expr)
                {
                    self.push_import(&specifier);
                }
            }
            Callee::Super(_) => {}
        }

        node.visit_children_with(self);
    }
}

/// `call(...)` or `await call(...)`, looking through parentheses.
fn unwrap_call(expr: &Expr) -> Option<&CallExpr> {
    match expr {
        Expr::Call(call) => Some(call),
        Expr::Await(await_expr) => unwrap_call(&await_expr.arg),
        Expr::Paren(paren) => unwrap_call(&paren.expr),
        _ => None,
    }
}

/// A string literal or an expression-free template literal.
fn literal_string(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .and_then(|s| s.as_str().map(|s| s.to_string())),
        Expr::Paren(paren) => literal_string(&paren.expr),
        _ => None,
    }
}

fn prop_name_is(key: &PropName, name: &str) -> bool {
    match key {
        PropName::Ident(ident) => ident.sym.as_str() == name,
        PropName::Str(s) => s.value.as_str() == Some(name),
        _ => false,
    }
}

/// Interpret the first argument of an accessor constructor call.
fn namespace_arg(call: &CallExpr) -> NamespaceArg {
    let Some(first) = call.args.first() else {
        return NamespaceArg::Missing;
    };
    if first.spread.is_some() {
        return NamespaceArg::Dynamic;
    }

    if let Some(value) = literal_string(&first.expr) {
        return if value.is_empty() {
            NamespaceArg::Missing
        } else {
            NamespaceArg::Literal(value)
        };
    }

    // getTranslations({ locale, namespace: "ns" })
    if let Expr::Object(obj) = &*first.expr {
        let mut dynamic = false;
        for prop in &obj.props {
            match prop {
                PropOrSpread::Spread(_) => dynamic = true,
                PropOrSpread::Prop(prop) => match &**prop {
                    Prop::KeyValue(kv) if prop_name_is(&kv.key, "namespace") => {
                        return match literal_string(&kv.value) {
                            Some(value) if !value.is_empty() => NamespaceArg::Literal(value),
                            _ => NamespaceArg::Dynamic,
                        };
                    }
                    Prop::Shorthand(ident) if ident.sym.as_str() == "namespace" => {
                        dynamic = true;
                    }
                    _ => {}
                },
            }
        }
        return if dynamic {
            NamespaceArg::Dynamic
        } else {
            NamespaceArg::Missing
        };
    }

    NamespaceArg::Dynamic
}

/// Extract all identifier names from a pattern (handles destructuring).
fn extract_binding_names(pat: &Pat) -> Vec<String> {
    match pat {
        Pat::Ident(ident) => vec![ident.id.sym.to_string()],
        Pat::Object(obj) => obj
            .props
            .iter()
            .flat_map(|prop| match prop {
                ObjectPatProp::KeyValue(kv) => extract_binding_names(&kv.value),
                ObjectPatProp::Assign(assign) => vec![assign.key.sym.to_string()],
                ObjectPatProp::Rest(rest) => extract_binding_names(&rest.arg),
            })
            .collect(),
        Pat::Array(arr) => arr
            .elems
            .iter()
            .flatten()
            .flat_map(extract_binding_names)
            .collect(),
        Pat::Assign(assign) => extract_binding_names(&assign.left),
        Pat::Rest(rest) => extract_binding_names(&rest.arg),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::extract::ast::*;
    use crate::core::extract::{BindingOrigin, KeyExtractor};

    fn extract(source: &str) -> FileExtraction {
        AstExtractor::new(ExtractorOptions::default())
            .extract(source, "component.tsx")
            .unwrap()
    }

    #[test]
    fn test_parameter_shadows_accessor() {
        let result = extract(
            r#"
export function Table({ rows }) {
  const t = useTranslations("table");
  return rows.map((t) => t("row.label")).concat(t("header"));
}
"#,
        );
        assert!(result.keys.contains("table", "header"));
        assert!(!result.keys.contains("table", "row.label"));
    }

    #[test]
    fn test_inner_function_sees_outer_binding() {
        let result = extract(
            r#"
export function Menu() {
  const t = useTranslations("menu");
  const render = () => t("item");
  return render();
}
"#,
        );
        assert!(result.keys.contains("menu", "item"));
    }

    #[test]
    fn test_scoped_rebinding() {
        let result = extract(
            r#"
function A() { const t = useTranslations("first"); return t("one"); }
function B() { const t = useTranslations("second"); return t("two"); }
"#,
        );
        assert!(result.keys.contains("first", "one"));
        assert!(result.keys.contains("second", "two"));
        assert_eq!(result.keys.len(), 2);
    }

    #[test]
    fn test_accessor_site_position() {
        let result = extract("const a = 1;\nconst t = useTranslations(\"x\");\n");
        assert_eq!(result.accessors.len(), 1);
        assert_eq!(result.accessors[0].line, 2);
        assert_eq!(result.accessors[0].col, 11);
        assert_eq!(result.accessors[0].origin, BindingOrigin::Sync);
    }

    #[test]
    fn test_parse_failure_is_error() {
        let result = AstExtractor::new(ExtractorOptions::default()).extract("const = ;", "x.ts");
        assert!(result.is_err());
    }
}
