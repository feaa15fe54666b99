//! Diagram Naming
//!
//! Maps declarations to group-qualified D2 identifiers such as
//! `"Current File"."App"."run()"` or `node_modules."lib-x"."fetch()"`.
//! Two declarations with the same group and name path share a node.

use std::collections::HashSet;
use std::path::{Component, Path};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::declaration::{DeclId, UnitId};
use crate::ports::DefinitionResolver;

pub const CURRENT_FILE_GROUP: &str = "Current File";
pub const DEPENDENCY_GROUP: &str = "node_modules";
pub const UNKNOWN_PACKAGE: &str = "Unknown Package";
pub const ANONYMOUS: &str = "anonymous";

static PACKAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"node_modules/((?:@[^/]+/)?[^/]+)").expect("package pattern is valid")
});

/// Rendering switches taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct DiagramOptions {
    /// Dependency packages whose declarations are left out entirely.
    pub ignored_packages: HashSet<String>,
    /// Drop file-path groups (including the current-file marker).
    pub omit_file_names: bool,
    /// Accepted for compatibility; has no effect on naming yet.
    pub dont_group_classes: bool,
}

/// Name of the dependency package a foreign file belongs to.
///
/// Uses the innermost `node_modules/<pkg>` or `node_modules/@scope/<pkg>`
/// segment; anything else is [`UNKNOWN_PACKAGE`].
pub fn origin_package(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    PACKAGE_PATTERN
        .captures_iter(&normalized)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_PACKAGE.to_string())
}

/// Quote one identifier segment for D2.
pub fn quote(segment: &str) -> String {
    format!("\"{}\"", segment.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Relative path from `from_dir` to `to`, always with `/` separators.
pub fn relative_path(from_dir: &Path, to: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let target: Vec<Component> = to.components().collect();
    let common = from
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Produces groups and identifiers relative to the file holding the root.
pub struct DiagramNaming<'a> {
    resolver: &'a dyn DefinitionResolver,
    current_unit: UnitId,
    options: &'a DiagramOptions,
}

impl<'a> DiagramNaming<'a> {
    pub fn new(
        resolver: &'a dyn DefinitionResolver,
        root: DeclId,
        options: &'a DiagramOptions,
    ) -> Self {
        let current_unit = resolver.declaration(root).unit;
        Self {
            resolver,
            current_unit,
            options,
        }
    }

    pub fn options(&self) -> &DiagramOptions {
        self.options
    }

    /// Group prefix of the file holding the root declaration.
    pub fn current_group(&self) -> Option<String> {
        self.group_for(self.current_unit)
    }

    /// Group prefix for a source unit. `Some("")` means "no group";
    /// `None` means the unit belongs to an ignored package.
    pub fn group_for(&self, unit: UnitId) -> Option<String> {
        if unit == self.current_unit {
            return Some(if self.options.omit_file_names {
                String::new()
            } else {
                quote(CURRENT_FILE_GROUP)
            });
        }

        let source = self.resolver.source_unit(unit);
        if source.is_foreign {
            let package = origin_package(&source.path);
            if self.options.ignored_packages.contains(&package) {
                return None;
            }
            return Some(format!("{}.{}", DEPENDENCY_GROUP, quote(&package)));
        }

        if self.options.omit_file_names {
            return Some(String::new());
        }
        let current = self.resolver.source_unit(self.current_unit);
        let from_dir = current.path.parent().unwrap_or_else(|| Path::new(""));
        Some(quote(&relative_path(from_dir, &source.path)))
    }

    /// Name segments with the callable marked, e.g. `["App", "run()"]`.
    pub fn name_segments(&self, decl: DeclId) -> Vec<String> {
        let name = self
            .resolver
            .declaration(decl)
            .display_name()
            .unwrap_or_else(|| ANONYMOUS.to_string());
        let mut segments: Vec<String> = name.split('.').map(str::to_string).collect();
        if let Some(callable) = segments.last_mut() {
            callable.push_str("()");
        }
        segments
    }

    /// Full identifier, or `None` when the declaration is suppressed.
    pub fn identifier_for(&self, decl: DeclId) -> Option<String> {
        let group = self.group_for(self.resolver.declaration(decl).unit)?;
        let segments = self.name_segments(decl).into_iter().map(|s| quote(&s));
        let parts: Vec<String> = std::iter::once(group)
            .filter(|g| !g.is_empty())
            .chain(segments)
            .collect();
        Some(parts.join("."))
    }

    /// First rendered segment of a declaration's identifier.
    pub fn top_segment(&self, decl: DeclId) -> Option<String> {
        let group = self.group_for(self.resolver.declaration(decl).unit)?;
        if !group.is_empty() {
            return Some(group);
        }
        self.name_segments(decl).first().map(|s| quote(s))
    }
}
