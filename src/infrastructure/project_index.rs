//! Project Index
//!
//! Loads a TypeScript project, parses its files and every dependency file
//! reachable through imports, and answers the trace's two questions: where
//! is the entry declaration, and what does a call site refer to.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::call_target::CallTarget;
use crate::domain::declaration::{
    CallSite, Callee, DeclId, DeclKind, Declaration, Definition, Receiver, SourceUnit, SymbolKind,
    UnitId,
};
use crate::domain::error::TraceError;
use crate::domain::language::is_declaration_file;
use crate::infrastructure::module_resolver::ModuleResolver;
use crate::infrastructure::project_loader::ProjectLoader;
use crate::infrastructure::ts_parser::{
    parse_file, Body, ExportEntry, ImportBinding, Imported, ParsedFile, DEFAULT_EXPORT,
};
use crate::ports::{DeclarationLocator, DefinitionResolver};

/// (module, exported name) pairs already visited by one lookup.
type Visited = HashSet<(UnitId, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ClassId(usize);

/// Static and instance members live in separate namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    Instance,
    Static,
}

/// What a name denotes in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Symbol {
    Function(DeclId),
    Class(ClassId),
    /// A top-level variable, kept with its defining file so a known type can
    /// be looked up.
    Variable(UnitId, String),
    /// A namespace import or `export * as ns`.
    Module(UnitId),
    Other(SymbolKind),
}

impl Symbol {
    fn definition(&self) -> Definition {
        match self {
            Symbol::Function(id) => Definition::Callable(*id),
            Symbol::Class(_) => Definition::Other(SymbolKind::Class),
            Symbol::Variable(..) => Definition::Other(SymbolKind::Variable),
            Symbol::Module(_) => Definition::Other(SymbolKind::Namespace),
            Symbol::Other(kind) => Definition::Other(*kind),
        }
    }
}

#[derive(Debug)]
struct ClassEntry {
    unit: UnitId,
    base: Option<String>,
    fields: HashMap<String, String>,
    methods: HashMap<(String, Side), DeclId>,
}

/// Name tables for one source file.
#[derive(Debug, Default)]
struct FileTable {
    functions: HashMap<String, DeclId>,
    classes: HashMap<String, ClassId>,
    symbols: HashMap<String, SymbolKind>,
    variable_types: HashMap<String, String>,
    imports: HashMap<String, ImportBinding>,
    exports: Vec<ExportEntry>,
    /// Module specifier -> resolved file.
    modules: HashMap<String, UnitId>,
    is_declaration: bool,
}

/// Lexical context of a declaration.
#[derive(Debug)]
struct Scope {
    class: Option<ClassId>,
    /// What `this` is inside the declaration.
    side: Side,
    /// Parameters and locals with a known class type.
    bindings: HashMap<String, String>,
}

/// Every loaded file and declaration, addressed by arena ids.
#[derive(Debug, Default)]
pub struct ProjectIndex {
    units: Vec<SourceUnit>,
    files: Vec<FileTable>,
    unit_by_path: HashMap<PathBuf, UnitId>,
    declarations: Vec<Declaration>,
    scopes: Vec<Scope>,
    classes: Vec<ClassEntry>,
    project_units: HashSet<UnitId>,
}

impl ProjectIndex {
    /// Load the project named by `tsconfig_path` and index it.
    pub fn load(tsconfig_path: &Path) -> Result<Self> {
        let project = ProjectLoader::load(tsconfig_path)?;
        let modules = ModuleResolver::new(&project.root, &project.config.compiler_options);

        let mut index = ProjectIndex::default();
        let mut specifiers: Vec<HashMap<String, PathBuf>> = Vec::new();
        let mut seen: HashSet<PathBuf> = project.files.iter().cloned().collect();
        let mut pending = project.files.clone();

        // Breadth-first over the import graph, one parallel batch per layer.
        while !pending.is_empty() {
            let parsed = pending
                .par_iter()
                .map(|path| parse_file(path).map(|file| (path.clone(), file)))
                .collect::<Result<Vec<_>>>()?;

            let mut next = Vec::new();
            for (path, file) in parsed {
                let is_foreign = is_foreign_path(&path);
                let followed = if is_foreign {
                    file.forwarded_specifiers()
                } else {
                    file.module_specifiers()
                };

                let mut resolved = HashMap::new();
                for specifier in followed {
                    match modules.resolve(&path, specifier) {
                        Some(target) => {
                            if seen.insert(target.clone()) {
                                next.push(target.clone());
                            }
                            resolved.insert(specifier.to_string(), target);
                        }
                        None => debug!(
                            from = %path.display(),
                            specifier,
                            "Unresolved module specifier"
                        ),
                    }
                }

                index.add_file(path, is_foreign, file);
                specifiers.push(resolved);
            }
            next.sort();
            pending = next;
        }

        for (unit, resolved) in specifiers.into_iter().enumerate() {
            let modules = resolved
                .into_iter()
                .filter_map(|(spec, path)| Some((spec, *index.unit_by_path.get(&path)?)))
                .collect();
            index.files[unit].modules = modules;
        }
        index.project_units = project
            .files
            .iter()
            .filter_map(|path| index.unit_by_path.get(path).copied())
            .collect();

        info!(
            project_files = index.project_units.len(),
            dependency_files = index.units.len() - index.project_units.len(),
            declarations = index.declarations.len(),
            "Indexed project"
        );
        Ok(index)
    }

    fn add_file(&mut self, path: PathBuf, is_foreign: bool, parsed: ParsedFile) {
        let unit = UnitId(self.units.len());
        let mut table = FileTable {
            symbols: parsed.symbols.into_iter().collect(),
            variable_types: parsed.variable_types.into_iter().collect(),
            imports: parsed
                .imports
                .into_iter()
                .map(|binding| (binding.local.clone(), binding))
                .collect(),
            exports: parsed.exports,
            is_declaration: is_declaration_file(&path),
            ..Default::default()
        };

        for function in parsed.functions {
            let key = function
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_EXPORT.to_string());
            let id = self.add_declaration(
                function.name,
                None,
                DeclKind::Function,
                unit,
                function.line,
                function.body,
                None,
                Side::Instance,
            );
            table.functions.insert(key, id);
        }

        for class in parsed.classes {
            let class_id = ClassId(self.classes.len());
            self.classes.push(ClassEntry {
                unit,
                base: class.base,
                fields: class.fields.into_iter().collect(),
                methods: HashMap::new(),
            });
            for method in class.methods {
                let side = if method.is_static {
                    Side::Static
                } else {
                    Side::Instance
                };
                let id = self.add_declaration(
                    Some(method.name.clone()),
                    class.name.clone(),
                    DeclKind::Method,
                    unit,
                    method.line,
                    method.body,
                    Some(class_id),
                    side,
                );
                self.classes[class_id.0]
                    .methods
                    .insert((method.name, side), id);
            }
            let key = class.name.unwrap_or_else(|| DEFAULT_EXPORT.to_string());
            table.classes.insert(key, class_id);
        }

        self.unit_by_path.insert(path.clone(), unit);
        self.units.push(SourceUnit {
            id: unit,
            path,
            is_foreign,
        });
        self.files.push(table);
    }

    #[allow(clippy::too_many_arguments)]
    fn add_declaration(
        &mut self,
        name: Option<String>,
        container: Option<String>,
        kind: DeclKind,
        unit: UnitId,
        line: usize,
        body: Body,
        class: Option<ClassId>,
        side: Side,
    ) -> DeclId {
        let id = DeclId(self.declarations.len());
        self.declarations.push(Declaration {
            id,
            name,
            container,
            kind,
            unit,
            line,
            call_sites: body.call_sites,
        });
        self.scopes.push(Scope {
            class,
            side,
            bindings: body.bindings.into_iter().collect(),
        });
        id
    }

    /// Top-level names of `unit`, then its imports.
    fn resolve_name(&self, unit: UnitId, name: &str, visited: &mut Visited) -> Vec<Symbol> {
        let local = self.declared_in(unit, name);
        if !local.is_empty() {
            return local;
        }
        match self.files[unit.0].imports.get(name) {
            Some(binding) => self.resolve_import(unit, binding, visited),
            None => Vec::new(),
        }
    }

    /// Names declared by `unit` itself.
    fn declared_in(&self, unit: UnitId, name: &str) -> Vec<Symbol> {
        let table = &self.files[unit.0];
        let mut symbols = Vec::new();
        if let Some(&id) = table.functions.get(name) {
            symbols.push(Symbol::Function(id));
        }
        if let Some(&class) = table.classes.get(name) {
            symbols.push(Symbol::Class(class));
        }
        match table.symbols.get(name) {
            Some(SymbolKind::Variable) => symbols.push(Symbol::Variable(unit, name.to_string())),
            // A class merged with a same-named interface is still one class.
            Some(SymbolKind::Interface) if table.classes.contains_key(name) => {}
            Some(kind) => symbols.push(Symbol::Other(*kind)),
            None => {}
        }
        symbols
    }

    fn resolve_import(
        &self,
        unit: UnitId,
        binding: &ImportBinding,
        visited: &mut Visited,
    ) -> Vec<Symbol> {
        let Some(&target) = self.files[unit.0].modules.get(&binding.source) else {
            return Vec::new();
        };
        match &binding.imported {
            Imported::Named(name) => self.resolve_export(target, name, visited),
            Imported::Default => self.resolve_export(target, DEFAULT_EXPORT, visited),
            Imported::Namespace => vec![Symbol::Module(target)],
        }
    }

    /// What `unit` exports under `name`, following re-export chains.
    ///
    /// Each (module, name) pair is expanded at most once per lookup, so
    /// cyclic barrels terminate and shared branches are not re-walked.
    fn resolve_export(&self, unit: UnitId, name: &str, visited: &mut Visited) -> Vec<Symbol> {
        if !visited.insert((unit, name.to_string())) {
            return Vec::new();
        }
        let table = &self.files[unit.0];
        let mut symbols = Vec::new();

        for entry in &table.exports {
            match entry {
                ExportEntry::Local { exported, local } if exported == name => {
                    symbols.extend(self.resolve_name(unit, local, visited));
                }
                ExportEntry::Named {
                    exported,
                    imported,
                    source,
                } if exported == name => {
                    if let Some(&target) = table.modules.get(source) {
                        symbols.extend(self.resolve_export(target, imported, visited));
                    }
                }
                ExportEntry::Namespace { exported, source } if exported == name => {
                    if let Some(&target) = table.modules.get(source) {
                        symbols.push(Symbol::Module(target));
                    }
                }
                _ => {}
            }
        }

        if symbols.is_empty() && name != DEFAULT_EXPORT {
            for entry in &table.exports {
                if let ExportEntry::All { source } = entry {
                    if let Some(&target) = table.modules.get(source) {
                        symbols.extend(self.resolve_export(target, name, visited));
                    }
                }
            }
        }

        // Declaration files export their top-level declarations implicitly.
        if symbols.is_empty() && table.is_declaration {
            symbols = self.declared_in(unit, name);
        }

        symbols.dedup();
        symbols
    }

    fn lookup(&self, unit: UnitId, name: &str) -> Vec<Symbol> {
        self.resolve_name(unit, name, &mut Visited::new())
    }

    /// The class a type name refers to, as seen from `unit`.
    fn resolve_class(&self, unit: UnitId, type_name: &str) -> Option<ClassId> {
        self.lookup(unit, type_name)
            .into_iter()
            .find_map(|symbol| match symbol {
                Symbol::Class(class) => Some(class),
                _ => None,
            })
    }

    /// `class` followed by its base classes, nearest first. Stops at the
    /// first class seen twice.
    fn class_chain(&self, class: ClassId) -> Vec<ClassId> {
        let mut chain = vec![class];
        let mut current = class;
        loop {
            let entry = &self.classes[current.0];
            let Some(base) = entry
                .base
                .as_deref()
                .and_then(|b| self.resolve_class(entry.unit, b))
            else {
                break;
            };
            if chain.contains(&base) {
                debug!("Cyclic class hierarchy");
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
    }

    fn base_of(&self, class: ClassId) -> Option<ClassId> {
        self.class_chain(class).get(1).copied()
    }

    /// A method of `class` or the nearest base class that declares it.
    fn find_method(&self, class: ClassId, name: &str, side: Side) -> Option<DeclId> {
        let key = (name.to_string(), side);
        self.class_chain(class)
            .into_iter()
            .find_map(|c| self.classes[c.0].methods.get(&key).copied())
    }

    /// The class type of a field on `class` or its bases.
    fn field_class(&self, class: ClassId, field: &str) -> Option<ClassId> {
        self.class_chain(class).into_iter().find_map(|c| {
            let entry = &self.classes[c.0];
            entry
                .fields
                .get(field)
                .and_then(|type_name| self.resolve_class(entry.unit, type_name))
        })
    }

    fn resolve_member(
        &self,
        caller: DeclId,
        receiver: &Receiver,
        property: &str,
    ) -> Vec<Symbol> {
        let unit = self.declarations[caller.0].unit;
        let scope = &self.scopes[caller.0];

        let method = |class: Option<ClassId>, side: Side| -> Vec<Symbol> {
            class
                .and_then(|c| self.find_method(c, property, side))
                .map(Symbol::Function)
                .into_iter()
                .collect()
        };

        match receiver {
            Receiver::This => method(scope.class, scope.side),
            Receiver::Super => method(scope.class.and_then(|c| self.base_of(c)), scope.side),
            Receiver::ThisField(field) => method(
                scope.class.and_then(|c| self.field_class(c, field)),
                Side::Instance,
            ),
            Receiver::Ident(name) => {
                if let Some(type_name) = scope.bindings.get(name) {
                    return method(self.resolve_class(unit, type_name), Side::Instance);
                }
                let mut symbols = Vec::new();
                for symbol in self.lookup(unit, name) {
                    match symbol {
                        Symbol::Class(class) => symbols.extend(method(Some(class), Side::Static)),
                        Symbol::Module(module) => symbols.extend(self.resolve_export(
                            module,
                            property,
                            &mut Visited::new(),
                        )),
                        Symbol::Variable(defined_in, variable) => {
                            let class = self.files[defined_in.0]
                                .variable_types
                                .get(&variable)
                                .and_then(|t| self.resolve_class(defined_in, t));
                            symbols.extend(method(class, Side::Instance));
                        }
                        _ => {}
                    }
                }
                symbols.dedup();
                symbols
            }
            Receiver::Expr => Vec::new(),
        }
    }
}

impl DefinitionResolver for ProjectIndex {
    fn declaration(&self, id: DeclId) -> &Declaration {
        &self.declarations[id.0]
    }

    fn source_unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id.0]
    }

    fn resolve_definition(&self, caller: DeclId, site: &CallSite) -> Vec<Definition> {
        let symbols = match &site.callee {
            Callee::Name(name) => {
                // A typed local or parameter shadows top-level names.
                if self.scopes[caller.0].bindings.contains_key(name) {
                    return vec![Definition::Other(SymbolKind::Variable)];
                }
                self.lookup(self.declarations[caller.0].unit, name)
            }
            Callee::Member { receiver, property } => {
                self.resolve_member(caller, receiver, property)
            }
            Callee::Other => Vec::new(),
        };
        symbols.iter().map(Symbol::definition).collect()
    }
}

impl DeclarationLocator for ProjectIndex {
    fn locate(&self, file: &Path, target: &CallTarget) -> Result<DeclId, TraceError> {
        let not_found = || TraceError::SourceFileNotFound(file.to_path_buf());
        let canonical = fs::canonicalize(file).map_err(|_| not_found())?;
        let unit = self
            .unit_by_path
            .get(&canonical)
            .copied()
            .filter(|u| self.project_units.contains(u))
            .ok_or_else(not_found)?;
        let table = &self.files[unit.0];

        match target {
            CallTarget::Function(name) => {
                table
                    .functions
                    .get(name)
                    .copied()
                    .ok_or_else(|| TraceError::FunctionNotFound {
                        name: name.clone(),
                        file: file.to_path_buf(),
                    })
            }
            CallTarget::Method { class, method } => {
                let class_id =
                    table
                        .classes
                        .get(class)
                        .copied()
                        .ok_or_else(|| TraceError::ClassNotFound {
                            name: class.clone(),
                            file: file.to_path_buf(),
                        })?;
                // `Class.method` names an instance method first, then a static one.
                let methods = &self.classes[class_id.0].methods;
                [Side::Instance, Side::Static]
                    .into_iter()
                    .find_map(|side| methods.get(&(method.clone(), side)).copied())
                    .ok_or_else(|| TraceError::MethodNotFound {
                        class: class.clone(),
                        method: method.clone(),
                        file: file.to_path_buf(),
                    })
            }
        }
    }
}

/// Dependency files live under a `node_modules` directory.
fn is_foreign_path(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "node_modules")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::callgraph::trace;
    use tempfile::{tempdir, TempDir};

    fn project(files: &[(&str, &str)]) -> (TempDir, ProjectIndex) {
        let dir = tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let index = ProjectIndex::load(&dir.path().join("tsconfig.json")).unwrap();
        (dir, index)
    }

    fn locate(index: &ProjectIndex, dir: &TempDir, file: &str, target: &str) -> DeclId {
        index
            .locate(&dir.path().join(file), &CallTarget::parse(target).unwrap())
            .unwrap()
    }

    fn callee_names(index: &ProjectIndex, root: DeclId) -> Vec<String> {
        let graph = trace(index, root);
        graph
            .callees(root)
            .unwrap()
            .iter()
            .map(|&id| index.declaration(id).display_name().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_imports_and_dependencies() {
        let (dir, index) = project(&[
            ("tsconfig.json", r#"{ "include": ["src"] }"#),
            (
                "src/app.ts",
                r#"
import { fetch } from "lib-x";
import { helper as help } from "./util";
import * as text from "./text";

export function main() {
    help();
    fetch("/");
    text.shout();
    console.log("done");
}
"#,
            ),
            ("src/util.ts", "export function helper() { return 1; }"),
            ("src/text.ts", "export function shout() {}"),
            (
                "node_modules/lib-x/package.json",
                r#"{ "name": "lib-x", "types": "index.d.ts" }"#,
            ),
            (
                "node_modules/lib-x/index.d.ts",
                r#"export { fetch } from "./fetch";"#,
            ),
            (
                "node_modules/lib-x/fetch.d.ts",
                "export declare function fetch(url: string): Promise<string>;",
            ),
        ]);

        let main = locate(&index, &dir, "src/app.ts", "main");
        assert_eq!(callee_names(&index, main), vec!["helper", "fetch", "shout"]);

        let graph = trace(&index, main);
        let fetch = graph.callees(main).unwrap()[1];
        let unit = index.source_unit(index.declaration(fetch).unit);
        assert!(unit.is_foreign);
        assert!(unit.path.ends_with("node_modules/lib-x/fetch.d.ts"));
    }

    #[test]
    fn test_class_receivers() {
        let (dir, index) = project(&[
            ("tsconfig.json", "{}"),
            (
                "services/repo.ts",
                r#"
export class Store {
    flush() {}
}
export class Repo extends Store {
    save() { this.flush(); }
    static open() {}
}
export const defaultRepo = new Repo();
"#,
            ),
            (
                "services/app.ts",
                r#"
import { Repo, defaultRepo } from "./repo";

export class App {
    constructor(private repo: Repo) {}

    run(other: Repo) {
        this.repo.save();
        this.repo.flush();
        other.save();
        Repo.open();
        defaultRepo.save();
        const local = new Repo();
        local.flush();
        this.finish();
    }

    finish() {}
}
"#,
            ),
        ]);

        let run = locate(&index, &dir, "services/app.ts", "App.run");
        assert_eq!(
            callee_names(&index, run),
            vec!["Repo.save", "Store.flush", "Repo.open", "App.finish"]
        );
        let save = locate(&index, &dir, "services/repo.ts", "Repo.save");
        assert_eq!(callee_names(&index, save), vec!["Store.flush"]);
    }

    #[test]
    fn test_default_and_star_exports() {
        let (dir, index) = project(&[
            ("tsconfig.json", "{}"),
            (
                "main.ts",
                r#"
import start from "./start";
import { tool } from "./barrel";
export function main() { start(); tool(); }
"#,
            ),
            ("start.ts", "export default function () {}"),
            ("barrel.ts", r#"export * from "./tools";"#),
            ("tools.ts", "export function tool() {}"),
        ]);

        let main = locate(&index, &dir, "main.ts", "main");
        let graph = trace(&index, main);
        let callees = graph.callees(main).unwrap();
        assert_eq!(callees.len(), 2);
        assert_eq!(index.declaration(callees[0]).name, None);
        assert_eq!(index.declaration(callees[1]).name.as_deref(), Some("tool"));
    }

    #[test]
    fn test_non_callable_and_shadowed_names() {
        let (dir, index) = project(&[
            ("tsconfig.json", "{}"),
            (
                "main.ts",
                r#"
class Widget {}
const handler = () => 1;
function helper() {}
export function main(helper: Widget) {
    handler();
    helper();
}
"#,
            ),
        ]);

        let main = locate(&index, &dir, "main.ts", "main");
        assert!(callee_names(&index, main).is_empty());
    }

    #[test]
    fn test_cyclic_export_star_barrels_terminate() {
        let (dir, index) = project(&[
            ("tsconfig.json", "{}"),
            (
                "main.ts",
                r#"
import { helper, missing } from "./lib/index";
export function main() {
    missing();
    helper();
}
"#,
            ),
            (
                "lib/index.ts",
                "export * from \"./a\";\nexport * from \"./b\";\nexport * from \"./c\";\nexport * from \"./d\";\n",
            ),
            (
                "lib/a.ts",
                "export * from \"./index\";\nexport function helper() {}\n",
            ),
            ("lib/b.ts", "export * from \"./index\";\n"),
            ("lib/c.ts", "export * from \"./index\";\n"),
            ("lib/d.ts", "export * from \"./index\";\nexport * from \"./a\";\n"),
        ]);

        let main = locate(&index, &dir, "main.ts", "main");
        assert_eq!(callee_names(&index, main), vec!["helper"]);
    }

    #[test]
    fn test_static_and_instance_methods_are_distinct() {
        let (dir, index) = project(&[
            ("tsconfig.json", "{}"),
            (
                "factory.ts",
                r#"
export class Factory {
    static create() { return new Factory(); }
    create() { this.build(); }
    build() {}
    static reset() { this.create(); }
}
export function main(f: Factory) {
    Factory.create();
    f.create();
}
"#,
            ),
        ]);

        let lines = |root: DeclId| -> Vec<usize> {
            trace(&index, root)
                .callees(root)
                .unwrap()
                .iter()
                .map(|&id| index.declaration(id).line)
                .collect()
        };

        let main = locate(&index, &dir, "factory.ts", "main");
        assert_eq!(lines(main), vec![3, 4]);

        let reset = locate(&index, &dir, "factory.ts", "Factory.reset");
        assert_eq!(lines(reset), vec![3]);

        let create = locate(&index, &dir, "factory.ts", "Factory.create");
        assert_eq!(index.declaration(create).line, 4);
    }

    #[test]
    fn test_locate_errors() {
        let (dir, index) = project(&[
            ("tsconfig.json", r#"{ "include": ["src"] }"#),
            ("src/foo.ts", "export class Foo { baz() {} }\nexport function f() {}"),
            ("other/outside.ts", "export function f() {}"),
        ]);
        let file = dir.path().join("src/foo.ts");

        let err = index
            .locate(&file, &CallTarget::parse("Foo.bar").unwrap())
            .unwrap_err();
        assert!(matches!(err, TraceError::MethodNotFound { ref method, .. } if method == "bar"));

        let err = index
            .locate(&file, &CallTarget::parse("Nope.bar").unwrap())
            .unwrap_err();
        assert!(matches!(err, TraceError::ClassNotFound { .. }));

        let err = index
            .locate(&file, &CallTarget::parse("g").unwrap())
            .unwrap_err();
        assert!(matches!(err, TraceError::FunctionNotFound { .. }));

        let outside = dir.path().join("other/outside.ts");
        let err = index
            .locate(&outside, &CallTarget::parse("f").unwrap())
            .unwrap_err();
        assert_eq!(err, TraceError::SourceFileNotFound(outside));
    }

    #[test]
    fn test_is_foreign_path() {
        assert!(is_foreign_path(Path::new("/p/node_modules/x/index.d.ts")));
        assert!(!is_foreign_path(Path::new("/p/src/node_modules_helper.ts")));
    }
}
