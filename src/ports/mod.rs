use std::io::{self, Write};
use std::path::Path;

use crate::domain::call_target::CallTarget;
use crate::domain::callgraph::TraceGraph;
use crate::domain::declaration::{CallSite, DeclId, Declaration, Definition, SourceUnit, UnitId};
use crate::domain::error::TraceError;
use crate::domain::identifier::DiagramNaming;

pub mod d2_exporter;

/// Semantic lookup service: declarations, their files, and what a call
/// site's identifier refers to.
pub trait DefinitionResolver {
    fn declaration(&self, id: DeclId) -> &Declaration;
    fn source_unit(&self, id: UnitId) -> &SourceUnit;
    /// Every definition the call site's identifier denotes, as seen from
    /// inside `caller`. Zero, one, or many.
    fn resolve_definition(&self, caller: DeclId, site: &CallSite) -> Vec<Definition>;
}

/// Finds the starting declaration by name inside a file.
pub trait DeclarationLocator {
    fn locate(&self, file: &Path, target: &CallTarget) -> Result<DeclId, TraceError>;
}

pub trait DiagramExporter {
    fn export(
        &self,
        naming: &DiagramNaming<'_>,
        root: DeclId,
        trace: &TraceGraph,
        out: &mut dyn Write,
    ) -> io::Result<()>;
}
