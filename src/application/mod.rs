// Application layer: one trace run, from command-line options to a diagram.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::call_target::CallTarget;
use crate::domain::callgraph::trace;
use crate::domain::identifier::{DiagramNaming, DiagramOptions};
use crate::infrastructure::ProjectIndex;
use crate::ports::d2_exporter::D2Exporter;
use crate::ports::{DeclarationLocator, DefinitionResolver, DiagramExporter};

/// Everything a run needs, as given on the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source_file: PathBuf,
    pub call_target: String,
    pub tsconfig: PathBuf,
    pub ignored_packages: Vec<String>,
    pub omit_file_names: bool,
    pub dont_group_classes: bool,
}

impl RunOptions {
    pub fn diagram_options(&self) -> DiagramOptions {
        DiagramOptions {
            ignored_packages: self.ignored_packages.iter().cloned().collect::<HashSet<_>>(),
            omit_file_names: self.omit_file_names,
            dont_group_classes: self.dont_group_classes,
        }
    }
}

pub struct TraceUsecase<'a> {
    pub locator: &'a dyn DeclarationLocator,
    pub resolver: &'a dyn DefinitionResolver,
    pub exporter: &'a dyn DiagramExporter,
}

impl<'a> TraceUsecase<'a> {
    /// Locate the entry point, trace it, and write the diagram.
    ///
    /// Nothing reaches `out` unless the entry point was found.
    pub fn run(
        &self,
        options: &RunOptions,
        target: &CallTarget,
        out: &mut dyn Write,
    ) -> Result<()> {
        let root = self.locator.locate(&options.source_file, target)?;
        let graph = trace(self.resolver, root);
        info!(
            target = %target,
            declarations = graph.len(),
            edges = graph.edge_count(),
            "Traced entry point"
        );

        let diagram_options = options.diagram_options();
        let naming = DiagramNaming::new(self.resolver, root, &diagram_options);
        self.exporter
            .export(&naming, root, &graph, out)
            .context("Failed to write diagram")?;
        Ok(())
    }
}

/// Parse the call target, load the project, and run a trace against it.
pub fn run(options: &RunOptions, out: &mut dyn Write) -> Result<()> {
    let target = CallTarget::parse(&options.call_target)?;
    let index = ProjectIndex::load(&options.tsconfig)?;

    let usecase = TraceUsecase {
        locator: &index,
        resolver: &index,
        exporter: &D2Exporter,
    };
    usecase.run(options, &target, out)
}
