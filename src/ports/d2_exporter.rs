//! D2 Diagram Exporter
//!
//! Writes a trace graph as a D2 diagram: layout direction, group pins,
//! root and dependency-group styling, then one line per call edge.

use std::io::{self, Write};

use crate::domain::callgraph::TraceGraph;
use crate::domain::declaration::DeclId;
use crate::domain::identifier::{DiagramNaming, DEPENDENCY_GROUP};
use crate::ports::DiagramExporter;

pub const ROOT_FILL: &str = "#a3ffd7";
pub const DEPENDENCY_FILL: &str = "#FFFFFF";

pub struct D2Exporter;

impl D2Exporter {
    /// Render the diagram into a string.
    pub fn to_d2(naming: &DiagramNaming<'_>, root: DeclId, trace: &TraceGraph) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = D2Exporter.export(naming, root, trace, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl DiagramExporter for D2Exporter {
    fn export(
        &self,
        naming: &DiagramNaming<'_>,
        root: DeclId,
        trace: &TraceGraph,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        writeln!(out, "direction: down")?;

        let pinned = naming
            .current_group()
            .filter(|group| !group.is_empty())
            .or_else(|| naming.top_segment(root));
        if let Some(group) = pinned {
            writeln!(out, "{}.near: top-center", group)?;
        }

        if let Some(root_id) = naming.identifier_for(root) {
            writeln!(out, "{}.style.fill: \"{}\"", root_id, ROOT_FILL)?;
        }

        writeln!(out, "{}.style.fill: \"{}\"", DEPENDENCY_GROUP, DEPENDENCY_FILL)?;
        writeln!(out, "{}.near: bottom-center", DEPENDENCY_GROUP)?;

        for node in trace.nodes() {
            let Some(source) = naming.identifier_for(node.decl) else {
                continue;
            };
            for &callee in &node.callees {
                if let Some(destination) = naming.identifier_for(callee) {
                    writeln!(out, "{} -> {}", source, destination)?;
                }
            }
        }

        out.flush()
    }
}
