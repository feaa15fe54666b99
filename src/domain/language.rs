//! Language Domain Module
//!
//! Source dialects calltrace can parse, inferred from file extensions.

use std::path::Path;

/// Supported source dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    TypeScript,
    /// TypeScript with JSX (`.tsx`).
    Tsx,
    /// Plain JavaScript shipped by dependencies; parsed with the TypeScript grammar.
    JavaScript,
}

impl Language {
    /// Infer language from file extension.
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext.to_lowercase().as_str() {
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Infer language from a file path.
    pub fn from_path(path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the display name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::JavaScript => "JavaScript",
        }
    }

    /// Extensions tried, in order, when a module specifier omits one.
    pub fn resolution_extensions() -> &'static [&'static str] {
        &["ts", "tsx", "d.ts", "mts", "cts", "js", "mjs", "cjs", "jsx"]
    }

    /// Whether files of this language belong to a TypeScript project's own sources.
    pub fn is_project_source(&self) -> bool {
        matches!(self, Language::TypeScript | Language::Tsx)
    }
}

/// True for ambient declaration files (`.d.ts`, `.d.mts`, `.d.cts`).
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(".d.ts") || n.ends_with(".d.mts") || n.ends_with(".d.cts"))
        .unwrap_or(false)
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
