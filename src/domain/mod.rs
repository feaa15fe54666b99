// Domain layer: declarations, the trace graph, and diagram naming.

pub mod call_target;
pub mod callgraph;
pub mod declaration;
pub mod error;
pub mod identifier;
pub mod language;

#[cfg(test)]
pub(crate) mod fixtures;
