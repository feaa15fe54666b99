// Infrastructure for calltrace: tsconfig loading, tree-sitter parsing,
// module resolution, and the project index behind the resolver ports.

pub mod module_resolver;
pub mod project_index;
pub mod project_loader;
pub mod ts_parser;
pub mod tsconfig;

pub use project_index::ProjectIndex;
pub use project_loader::{Project, ProjectLoader};
