// Trace graph structures for calltrace.
// Represents which declarations a traced entry point reaches, and the
// breadth-first builder that produces them.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::domain::declaration::{DeclId, Definition};
use crate::ports::DefinitionResolver;

/// A visited declaration and the declarations its call sites resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceNode {
    pub decl: DeclId,
    pub callees: Vec<DeclId>,
}

/// Visited declarations in discovery order, each key present at most once.
#[derive(Debug, Default, Clone)]
pub struct TraceGraph {
    nodes: Vec<TraceNode>,
    index: HashMap<DeclId, usize>,
}

impl TraceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the out-edges of `decl`. A key that is already present keeps
    /// its original edges.
    pub fn insert(&mut self, decl: DeclId, callees: Vec<DeclId>) -> bool {
        if self.index.contains_key(&decl) {
            return false;
        }
        self.index.insert(decl, self.nodes.len());
        self.nodes.push(TraceNode { decl, callees });
        true
    }

    pub fn contains(&self, decl: DeclId) -> bool {
        self.index.contains_key(&decl)
    }

    pub fn callees(&self, decl: DeclId) -> Option<&[DeclId]> {
        self.index.get(&decl).map(|&i| self.nodes[i].callees.as_slice())
    }

    /// Nodes in insertion (BFS discovery) order.
    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.callees.len()).sum()
    }
}

/// True when the declaration lives in the user's own codebase.
pub fn is_local(resolver: &dyn DefinitionResolver, decl: DeclId) -> bool {
    let unit = resolver.declaration(decl).unit;
    !resolver.source_unit(unit).is_foreign
}

/// Breadth-first trace from `root` over direct, resolvable calls.
///
/// Foreign declarations become leaves: they can be edge targets but are
/// never expanded. Unresolvable, ambiguous, or non-callable call sites are
/// dropped.
pub fn trace(resolver: &dyn DefinitionResolver, root: DeclId) -> TraceGraph {
    let mut graph = TraceGraph::new();
    let mut queue: VecDeque<DeclId> = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        // Enqueued twice before its first expansion.
        if graph.contains(current) {
            continue;
        }

        let callees = direct_callees(resolver, current);

        let pending: Vec<DeclId> = callees
            .iter()
            .copied()
            .filter(|&callee| is_local(resolver, callee))
            .collect();

        graph.insert(current, callees);

        for callee in pending {
            if !graph.contains(callee) {
                queue.push_back(callee);
            }
        }
    }

    debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        "Trace complete"
    );
    graph
}

/// Deduplicated, function-like definitions of `decl`'s call sites, in
/// call-site order.
fn direct_callees(resolver: &dyn DefinitionResolver, decl: DeclId) -> Vec<DeclId> {
    let declaration = resolver.declaration(decl);
    debug!(
        declaration = ?declaration.display_name(),
        call_sites = declaration.call_sites.len(),
        "Expanding declaration"
    );

    let mut callees = Vec::new();
    for site in &declaration.call_sites {
        let Some(name) = site.callee.callable_name() else {
            debug!(line = site.line, "Dropping call site without a callable name");
            continue;
        };
        match resolver.resolve_definition(decl, site).as_slice() {
            [Definition::Callable(target)] => {
                if !callees.contains(target) {
                    callees.push(*target);
                }
            }
            [] => debug!(name, line = site.line, "Dropping unresolved call site"),
            [Definition::Other(kind)] => {
                debug!(name, line = site.line, ?kind, "Dropping non-callable definition")
            }
            many => debug!(
                name,
                line = site.line,
                definitions = many.len(),
                "Dropping ambiguous call site"
            ),
        }
    }
    callees
}
