// In-memory resolver used by unit tests.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::declaration::{
    CallSite, Callee, DeclId, DeclKind, Declaration, Definition, SourceUnit, UnitId,
};
use crate::ports::DefinitionResolver;

/// Resolves call sites by (caller, callee name) lookups registered up front.
#[derive(Default)]
pub(crate) struct FakeResolver {
    units: Vec<SourceUnit>,
    decls: Vec<Declaration>,
    links: HashMap<(DeclId, String), Vec<Definition>>,
}

impl FakeResolver {
    pub fn unit(&mut self, path: &str, is_foreign: bool) -> UnitId {
        let id = UnitId(self.units.len());
        self.units.push(SourceUnit {
            id,
            path: PathBuf::from(path),
            is_foreign,
        });
        id
    }

    pub fn function(&mut self, unit: UnitId, name: &str, calls: &[&str]) -> DeclId {
        self.push(unit, Some(name), None, DeclKind::Function, calls)
    }

    pub fn method(&mut self, unit: UnitId, class: &str, name: &str, calls: &[&str]) -> DeclId {
        self.push(unit, Some(name), Some(class), DeclKind::Method, calls)
    }

    pub fn anonymous(&mut self, unit: UnitId) -> DeclId {
        self.push(unit, None, None, DeclKind::Function, &[])
    }

    pub fn call(&mut self, decl: DeclId, callee: Callee) {
        let line = self.decls[decl.0].call_sites.len() + 2;
        self.decls[decl.0].call_sites.push(CallSite { callee, line });
    }

    pub fn link(&mut self, from: DeclId, name: &str, to: DeclId) {
        self.link_many(from, name, vec![Definition::Callable(to)]);
    }

    pub fn link_many(&mut self, from: DeclId, name: &str, definitions: Vec<Definition>) {
        self.links.insert((from, name.to_string()), definitions);
    }

    fn push(
        &mut self,
        unit: UnitId,
        name: Option<&str>,
        container: Option<&str>,
        kind: DeclKind,
        calls: &[&str],
    ) -> DeclId {
        let id = DeclId(self.decls.len());
        let call_sites = calls
            .iter()
            .enumerate()
            .map(|(i, callee)| CallSite {
                callee: Callee::Name(callee.to_string()),
                line: i + 2,
            })
            .collect();
        self.decls.push(Declaration {
            id,
            name: name.map(str::to_string),
            container: container.map(str::to_string),
            kind,
            unit,
            line: 1,
            call_sites,
        });
        id
    }
}

impl DefinitionResolver for FakeResolver {
    fn declaration(&self, id: DeclId) -> &Declaration {
        &self.decls[id.0]
    }

    fn source_unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id.0]
    }

    fn resolve_definition(&self, caller: DeclId, site: &CallSite) -> Vec<Definition> {
        site.callee
            .callable_name()
            .and_then(|name| self.links.get(&(caller, name.to_string())))
            .cloned()
            .unwrap_or_default()
    }
}
