//! TypeScript Syntax Extraction
//!
//! Parses one file with tree-sitter and summarizes what the resolver needs:
//! top-level functions and classes, other top-level names, imports,
//! exports, and for every function or method its call sites and the
//! explicitly typed locals in scope.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use tree_sitter::{Node, Parser};

use crate::domain::declaration::{CallSite, Callee, Receiver, SymbolKind};
use crate::domain::language::Language;

/// Syntax summary of one source file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub functions: Vec<ParsedFunction>,
    pub classes: Vec<ParsedClass>,
    /// Non-callable top-level names.
    pub symbols: Vec<(String, SymbolKind)>,
    /// Top-level variables with a known class type: (name, type name).
    pub variable_types: Vec<(String, String)>,
    pub imports: Vec<ImportBinding>,
    pub exports: Vec<ExportEntry>,
    pub has_syntax_errors: bool,
}

impl ParsedFile {
    /// Every module specifier this file imports from or re-exports.
    pub fn module_specifiers(&self) -> Vec<&str> {
        let imports = self.imports.iter().map(|i| i.source.as_str());
        let exports = self.exports.iter().filter_map(|e| e.source());
        let mut specifiers: Vec<&str> = imports.chain(exports).collect();
        specifiers.sort_unstable();
        specifiers.dedup();
        specifiers
    }

    /// Module specifiers this file passes names through from: re-exports,
    /// and imports whose local binding is exported again.
    pub fn forwarded_specifiers(&self) -> Vec<&str> {
        let exported_locals: Vec<&str> = self
            .exports
            .iter()
            .filter_map(|e| match e {
                ExportEntry::Local { local, .. } => Some(local.as_str()),
                _ => None,
            })
            .collect();
        let imports = self
            .imports
            .iter()
            .filter(|i| exported_locals.contains(&i.local.as_str()))
            .map(|i| i.source.as_str());
        let exports = self.exports.iter().filter_map(|e| e.source());
        let mut specifiers: Vec<&str> = exports.chain(imports).collect();
        specifiers.sort_unstable();
        specifiers.dedup();
        specifiers
    }
}

/// What a function or method body contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub call_sites: Vec<CallSite>,
    /// Parameters and locals with a known class type: (name, type name).
    pub bindings: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ParsedFunction {
    /// `None` for an anonymous default export.
    pub name: Option<String>,
    pub line: usize,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct ParsedClass {
    /// `None` for an anonymous default export.
    pub name: Option<String>,
    pub line: usize,
    pub base: Option<String>,
    /// Fields and constructor parameter properties with a known type.
    pub fields: Vec<(String, String)>,
    pub methods: Vec<ParsedMethod>,
}

#[derive(Debug, Clone)]
pub struct ParsedMethod {
    pub name: String,
    pub is_static: bool,
    pub line: usize,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub source: String,
    pub imported: Imported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Named(String),
    Default,
    /// `import * as ns` or `import ns = require(...)`
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEntry {
    /// `export function f`, `export { a as b }`, `export default a`
    Local { exported: String, local: String },
    /// `export { a as b } from "m"`
    Named {
        exported: String,
        imported: String,
        source: String,
    },
    /// `export * as ns from "m"`
    Namespace { exported: String, source: String },
    /// `export * from "m"`
    All { source: String },
}

impl ExportEntry {
    pub fn source(&self) -> Option<&str> {
        match self {
            ExportEntry::Local { .. } => None,
            ExportEntry::Named { source, .. }
            | ExportEntry::Namespace { source, .. }
            | ExportEntry::All { source } => Some(source),
        }
    }
}

/// Name under which anonymous default exports are registered.
pub const DEFAULT_EXPORT: &str = "default";

/// Read and summarize a file from disk.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file {}", path.display()))?;
    let language = Language::from_path(path).unwrap_or_default();
    let parsed = parse_source(&source, language)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if parsed.has_syntax_errors {
        debug!(file = %path.display(), "Syntax errors present; using partial tree");
    }
    Ok(parsed)
}

/// Summarize source text.
pub fn parse_source(source: &str, language: Language) -> Result<ParsedFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar(language))
        .with_context(|| format!("Failed to load the {} grammar", language))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow!("tree-sitter produced no tree"))?;

    let root = tree.root_node();
    let mut extractor = Extractor {
        source,
        file: ParsedFile {
            has_syntax_errors: root.has_error(),
            ..Default::default()
        },
        function_slots: HashMap::new(),
    };
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        extractor.statement(statement, false);
    }
    Ok(extractor.file)
}

fn grammar(language: Language) -> tree_sitter::Language {
    match language {
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx | Language::JavaScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}

struct Extractor<'s> {
    source: &'s str,
    file: ParsedFile,
    /// Function name -> index in `file.functions`, for merging overloads.
    function_slots: HashMap<String, usize>,
}

impl<'s> Extractor<'s> {
    fn text(&self, node: Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.text(n).to_string())
    }

    fn statement(&mut self, node: Node, exported: bool) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                if let Some(name) = self.function(node) {
                    self.export_if(exported, &name);
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(name) = self.class(node) {
                    self.export_if(exported, &name);
                }
            }
            "lexical_declaration" | "variable_declaration" => self.variables(node, exported),
            "interface_declaration" => self.symbol(node, SymbolKind::Interface, exported),
            "enum_declaration" => self.symbol(node, SymbolKind::Enum, exported),
            "type_alias_declaration" => self.symbol(node, SymbolKind::TypeAlias, exported),
            "internal_module" | "module" => self.symbol(node, SymbolKind::Namespace, exported),
            "ambient_declaration" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.statement(child, exported);
                }
            }
            "expression_statement" => {
                if let Some(inner) = node.named_child(0) {
                    if inner.kind() == "internal_module" {
                        self.symbol(inner, SymbolKind::Namespace, exported);
                    }
                }
            }
            "export_statement" => self.export(node),
            "import_statement" => self.import(node),
            _ => {}
        }
    }

    fn export_if(&mut self, exported: bool, name: &str) {
        if exported {
            self.export_local(name, name);
        }
    }

    fn export_local(&mut self, exported: &str, local: &str) {
        let entry = ExportEntry::Local {
            exported: exported.to_string(),
            local: local.to_string(),
        };
        if !self.file.exports.contains(&entry) {
            self.file.exports.push(entry);
        }
    }

    /// Record a top-level function. Overload signatures and the
    /// implementation share one entry; the implementation's body wins.
    fn function(&mut self, node: Node) -> Option<String> {
        let name = self.field_text(node, "name");
        let has_body = node.child_by_field_name("body").is_some();
        let parsed = ParsedFunction {
            name: name.clone(),
            line: line_of(node.child_by_field_name("name").unwrap_or(node)),
            body: self.body(node),
        };

        match name.as_ref().and_then(|n| self.function_slots.get(n)) {
            Some(&slot) => {
                if has_body {
                    self.file.functions[slot] = parsed;
                }
            }
            None => {
                if let Some(n) = &name {
                    self.function_slots
                        .insert(n.clone(), self.file.functions.len());
                }
                self.file.functions.push(parsed);
            }
        }
        name
    }

    fn class(&mut self, node: Node) -> Option<String> {
        let name = self.field_text(node, "name");
        let mut class = ParsedClass {
            name: name.clone(),
            line: line_of(node.child_by_field_name("name").unwrap_or(node)),
            base: self.base_class(node),
            fields: Vec::new(),
            methods: Vec::new(),
        };

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                self.class_member(member, &mut class);
            }
        }

        self.file.classes.push(class);
        name
    }

    fn base_class(&self, class: Node) -> Option<String> {
        let mut cursor = class.walk();
        let heritage = class
            .children(&mut cursor)
            .find(|c| c.kind() == "class_heritage")?;
        let mut cursor = heritage.walk();
        let extends = heritage
            .children(&mut cursor)
            .find(|c| c.kind() == "extends_clause")?;
        let value = extends
            .child_by_field_name("value")
            .or_else(|| extends.named_child(0))?;
        self.expression_name(value)
    }

    fn class_member(&mut self, member: Node, class: &mut ParsedClass) {
        match member.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                let Some(name_node) = member.child_by_field_name("name") else {
                    return;
                };
                if !matches!(
                    name_node.kind(),
                    "property_identifier" | "private_property_identifier"
                ) {
                    return;
                }
                let name = self.text(name_node).to_string();
                if name == "constructor" {
                    class.fields.extend(self.parameter_properties(member));
                    return;
                }
                if has_token(member, "get") || has_token(member, "set") {
                    return;
                }
                let method = ParsedMethod {
                    name,
                    is_static: has_token(member, "static"),
                    line: line_of(name_node),
                    body: self.body(member),
                };
                // Overload signatures share one entry with the implementation.
                let existing = class
                    .methods
                    .iter()
                    .position(|m| m.name == method.name && m.is_static == method.is_static);
                match existing {
                    Some(i) if member.child_by_field_name("body").is_some() => {
                        class.methods[i] = method
                    }
                    Some(_) => {}
                    None => class.methods.push(method),
                }
            }
            "public_field_definition" => {
                if let Some(binding) = self.typed_binding(member) {
                    class.fields.push(binding);
                }
            }
            _ => {}
        }
    }

    /// `constructor(private repo: Repo)` declares a `repo` field.
    fn parameter_properties(&self, constructor: Node) -> Vec<(String, String)> {
        let Some(params) = constructor.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter(|p| {
                let mut c = p.walk();
                let is_property = p
                    .children(&mut c)
                    .any(|m| m.kind() == "accessibility_modifier" || m.kind() == "readonly");
                is_property
            })
            .filter_map(|p| self.parameter_binding(p))
            .collect()
    }

    fn variables(&mut self, node: Node, exported: bool) {
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = self.text(name_node).to_string();
            if let Some(binding) = self.typed_binding(declarator) {
                self.file.variable_types.push(binding);
            }
            self.export_if(exported, &name);
            self.file.symbols.push((name, SymbolKind::Variable));
        }
    }

    fn symbol(&mut self, node: Node, kind: SymbolKind, exported: bool) {
        if let Some(name) = self.field_text(node, "name") {
            self.export_if(exported, &name);
            self.file.symbols.push((name, kind));
        }
    }

    fn export(&mut self, node: Node) {
        let is_default = has_token(node, "default");

        if let Some(declaration) = node.child_by_field_name("declaration") {
            if is_default {
                self.statement(declaration, false);
                if let Some(name) = self.field_text(declaration, "name") {
                    self.export_local(DEFAULT_EXPORT, &name);
                }
            } else {
                self.statement(declaration, true);
            }
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            self.default_value(value);
            return;
        }

        let source = node
            .child_by_field_name("source")
            .map(|s| string_value(self.text(s)));
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "export_clause" => {
                    let mut specs = child.walk();
                    for spec in child.named_children(&mut specs) {
                        if spec.kind() != "export_specifier" {
                            continue;
                        }
                        let Some(name) = self.field_text(spec, "name") else {
                            continue;
                        };
                        let exported = self
                            .field_text(spec, "alias")
                            .unwrap_or_else(|| name.clone());
                        match &source {
                            Some(source) => self.file.exports.push(ExportEntry::Named {
                                exported,
                                imported: name,
                                source: source.clone(),
                            }),
                            None => self.export_local(&exported, &name),
                        }
                    }
                }
                "namespace_export" => {
                    let alias = child
                        .named_child(0)
                        .map(|n| string_value(self.text(n)));
                    if let (Some(exported), Some(source)) = (alias, &source) {
                        self.file.exports.push(ExportEntry::Namespace {
                            exported,
                            source: source.clone(),
                        });
                    }
                }
                // A bare `*` only appears in `export * from "m"`.
                "*" => {
                    if let Some(source) = &source {
                        self.file.exports.push(ExportEntry::All {
                            source: source.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    /// `export default <expression>`
    fn default_value(&mut self, value: Node) {
        match value.kind() {
            "function_expression" | "function" | "generator_function" => {
                let name = self.field_text(value, "name");
                let body = self.body(value);
                self.file.functions.push(ParsedFunction {
                    name: name.clone(),
                    line: line_of(value),
                    body,
                });
                let local = name.unwrap_or_else(|| DEFAULT_EXPORT.to_string());
                self.export_local(DEFAULT_EXPORT, &local);
            }
            "class" => {
                let name = self.class(value);
                let local = name.unwrap_or_else(|| DEFAULT_EXPORT.to_string());
                self.export_local(DEFAULT_EXPORT, &local);
            }
            "identifier" => {
                let local = self.text(value).to_string();
                self.export_local(DEFAULT_EXPORT, &local);
            }
            _ => {}
        }
    }

    fn import(&mut self, node: Node) {
        let source = node
            .child_by_field_name("source")
            .map(|s| string_value(self.text(s)));

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_clause" => {
                    if let Some(source) = &source {
                        self.import_clause(child, source);
                    }
                }
                // `import legacy = require("./c")`
                "import_require_clause" => {
                    let local = child.named_child(0).filter(|n| n.kind() == "identifier");
                    let required = child
                        .child_by_field_name("source")
                        .map(|s| string_value(self.text(s)));
                    if let (Some(local), Some(required)) = (local, required) {
                        self.file.imports.push(ImportBinding {
                            local: self.text(local).to_string(),
                            source: required,
                            imported: Imported::Namespace,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn import_clause(&mut self, clause: Node, source: &str) {
        let mut cursor = clause.walk();
        for part in clause.named_children(&mut cursor) {
            match part.kind() {
                "identifier" => self.file.imports.push(ImportBinding {
                    local: self.text(part).to_string(),
                    source: source.to_string(),
                    imported: Imported::Default,
                }),
                "namespace_import" => {
                    let mut c = part.walk();
                    let local = part
                        .named_children(&mut c)
                        .find(|n| n.kind() == "identifier")
                        .map(|n| self.text(n).to_string());
                    if let Some(local) = local {
                        self.file.imports.push(ImportBinding {
                            local,
                            source: source.to_string(),
                            imported: Imported::Namespace,
                        });
                    }
                }
                "named_imports" => {
                    let mut c = part.walk();
                    for spec in part.named_children(&mut c) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = self.field_text(spec, "name") else {
                            continue;
                        };
                        let local = self
                            .field_text(spec, "alias")
                            .unwrap_or_else(|| name.clone());
                        let imported = if name == DEFAULT_EXPORT {
                            Imported::Default
                        } else {
                            Imported::Named(name)
                        };
                        self.file.imports.push(ImportBinding {
                            local,
                            source: source.to_string(),
                            imported,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    /// Call sites and typed locals of a function-like node.
    fn body(&self, function: Node) -> Body {
        let mut body = Body::default();

        if let Some(params) = function.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                if let Some(binding) = self.parameter_binding(param) {
                    body.bindings.push(binding);
                }
            }
        }

        let Some(block) = function.child_by_field_name("body") else {
            return body;
        };

        // Every nested expression is scanned, including calls buried in
        // statement-level sub-expressions and callbacks.
        let mut stack = vec![block];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "call_expression" => {
                    if let Some(site) = self.call_site(node) {
                        body.call_sites.push(site);
                    }
                }
                "variable_declarator" => {
                    if let Some(binding) = self.typed_binding(node) {
                        body.bindings.push(binding);
                    }
                }
                _ => {}
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        body.call_sites.sort_by_key(|s| s.line);
        body
    }

    fn call_site(&self, call: Node) -> Option<CallSite> {
        // Tagged templates are not calls.
        if call
            .child_by_field_name("arguments")
            .map(|a| a.kind() == "template_string")
            .unwrap_or(false)
        {
            return None;
        }
        let function = call.child_by_field_name("function")?;
        let callee = match function.kind() {
            "identifier" => Callee::Name(self.text(function).to_string()),
            "member_expression" => self.member_callee(function),
            _ => Callee::Other,
        };
        Some(CallSite {
            callee,
            line: line_of(call),
        })
    }

    fn member_callee(&self, member: Node) -> Callee {
        let property = member
            .child_by_field_name("property")
            .filter(|p| matches!(p.kind(), "property_identifier" | "private_property_identifier"));
        let (Some(property), Some(object)) = (property, member.child_by_field_name("object"))
        else {
            return Callee::Other;
        };
        Callee::Member {
            receiver: self.receiver(object),
            property: self.text(property).to_string(),
        }
    }

    fn receiver(&self, object: Node) -> Receiver {
        match object.kind() {
            "this" => Receiver::This,
            "super" => Receiver::Super,
            "identifier" => Receiver::Ident(self.text(object).to_string()),
            "member_expression" => {
                let is_this = object
                    .child_by_field_name("object")
                    .map(|o| o.kind() == "this")
                    .unwrap_or(false);
                let field = object
                    .child_by_field_name("property")
                    .filter(|p| matches!(p.kind(), "property_identifier" | "private_property_identifier"));
                match (is_this, field) {
                    (true, Some(field)) => Receiver::ThisField(self.text(field).to_string()),
                    _ => Receiver::Expr,
                }
            }
            _ => Receiver::Expr,
        }
    }

    /// `(name, Type)` from `name: Type` or `name = new Type()`.
    fn typed_binding(&self, node: Node) -> Option<(String, String)> {
        let name_node = node.child_by_field_name("name")?;
        if !matches!(
            name_node.kind(),
            "identifier" | "property_identifier" | "private_property_identifier"
        ) {
            return None;
        }
        let type_name = node
            .child_by_field_name("type")
            .and_then(|t| self.annotation_type(t))
            .or_else(|| {
                let value = node.child_by_field_name("value")?;
                if value.kind() != "new_expression" {
                    return None;
                }
                self.expression_name(value.child_by_field_name("constructor")?)
            })?;
        Some((self.text(name_node).to_string(), type_name))
    }

    fn parameter_binding(&self, param: Node) -> Option<(String, String)> {
        if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
            return None;
        }
        let pattern = param.child_by_field_name("pattern")?;
        if pattern.kind() != "identifier" {
            return None;
        }
        let type_name = self.annotation_type(param.child_by_field_name("type")?)?;
        Some((self.text(pattern).to_string(), type_name))
    }

    /// Class name named by a type annotation, ignoring generics and qualifiers.
    fn annotation_type(&self, annotation: Node) -> Option<String> {
        let ty = if annotation.kind() == "type_annotation" {
            annotation.named_child(0)?
        } else {
            annotation
        };
        let name_node = match ty.kind() {
            "type_identifier" | "nested_type_identifier" => ty,
            "generic_type" => ty.child_by_field_name("name")?,
            _ => return None,
        };
        let text = self.text(name_node);
        text.rsplit('.').next().map(str::to_string)
    }

    fn expression_name(&self, expr: Node) -> Option<String> {
        match expr.kind() {
            "identifier" | "type_identifier" => Some(self.text(expr).to_string()),
            "member_expression" => self.field_text(expr, "property"),
            _ => None,
        }
    }
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// True when `node` has an anonymous child token of this kind.
fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}

fn string_value(literal: &str) -> String {
    literal
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}
