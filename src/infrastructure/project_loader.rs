use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::domain::language::{is_declaration_file, Language};
use crate::infrastructure::tsconfig::TsConfig;

/// A TypeScript project as described by its tsconfig.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory holding the tsconfig; all relative settings resolve against it.
    pub root: PathBuf,
    pub config: TsConfig,
    /// Canonical paths of the project's own source files, sorted.
    pub files: Vec<PathBuf>,
}

pub struct ProjectLoader;

impl ProjectLoader {
    /// Read a tsconfig and collect the source files it includes.
    pub fn load(tsconfig_path: &Path) -> Result<Project> {
        let tsconfig_path = fs::canonicalize(tsconfig_path)
            .with_context(|| format!("Cannot find tsconfig {}", tsconfig_path.display()))?;
        let config = TsConfig::load(&tsconfig_path)?;
        let root = tsconfig_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut files = Self::collect_files(&root, &config)?;
        files.sort();
        files.dedup();

        info!(
            root = %root.display(),
            files = files.len(),
            "Loaded TypeScript project"
        );

        Ok(Project {
            root,
            config,
            files,
        })
    }

    fn collect_files(root: &Path, config: &TsConfig) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        // Explicit `files` entries are taken as-is.
        for file in config.files.iter().flatten() {
            let path = root.join(file);
            let path = fs::canonicalize(&path)
                .with_context(|| format!("Cannot find project file {}", path.display()))?;
            files.push(path);
        }

        // With only `files` given, nothing else is included.
        if config.files.is_some() && config.include.is_none() {
            return Ok(files);
        }

        let include_patterns = config
            .include
            .clone()
            .unwrap_or_else(|| vec!["**/*".to_string()]);
        let include = build_globset(&include_patterns)?;
        let exclude = match &config.exclude {
            Some(patterns) => build_globset(patterns)?,
            None => build_globset(&["node_modules".to_string()])?,
        };

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e));

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_source = Language::from_path(path)
                .map(|lang| lang.is_project_source())
                .unwrap_or(false);
            if !is_source {
                continue;
            }
            let relative = match path.strip_prefix(root) {
                Ok(r) => r,
                Err(_) => continue,
            };
            if !include.is_match(relative) || exclude.is_match(relative) {
                debug!(file = %relative.display(), "Skipping file outside include set");
                continue;
            }
            files.push(path.to_path_buf());
        }

        debug!(
            declaration_files = files.iter().filter(|f| is_declaration_file(f)).count(),
            "Collected project files"
        );
        Ok(files)
    }
}

/// `node_modules` and VCS directories are never project sources.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name == "node_modules" || name == ".git")
            .unwrap_or(false)
}

/// tsconfig patterns: a bare directory or file stem means "everything under it".
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        builder.add(Glob::new(pattern)?);
        if !pattern.contains('*') && Path::new(pattern).extension().is_none() {
            builder.add(Glob::new(&format!("{}/**/*", pattern))?);
        }
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_include_directory_and_skip_node_modules() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "tsconfig.json", r#"{ "include": ["src"] }"#);
        write(root, "src/app.ts", "export function main() {}");
        write(root, "src/ui/view.tsx", "export function render() {}");
        write(root, "scripts/build.ts", "");
        write(root, "src/readme.md", "");
        write(root, "node_modules/lib-x/index.d.ts", "");

        let project = ProjectLoader::load(&root.join("tsconfig.json")).unwrap();
        let names: Vec<String> = project
            .files
            .iter()
            .map(|f| f.strip_prefix(&project.root).unwrap().display().to_string())
            .collect();

        assert_eq!(names, vec!["src/app.ts", "src/ui/view.tsx"]);
    }

    #[test]
    fn test_default_include_and_exclude() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "tsconfig.json", r#"{ "exclude": ["test"] }"#);
        write(root, "index.ts", "");
        write(root, "test/index.test.ts", "");

        let project = ProjectLoader::load(&root.join("tsconfig.json")).unwrap();

        assert_eq!(project.files.len(), 1);
        assert!(project.files[0].ends_with("index.ts"));
    }

    #[test]
    fn test_files_only() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "tsconfig.json", r#"{ "files": ["a.ts"] }"#);
        write(root, "a.ts", "");
        write(root, "b.ts", "");

        let project = ProjectLoader::load(&root.join("tsconfig.json")).unwrap();

        assert_eq!(project.files.len(), 1);
        assert!(project.files[0].ends_with("a.ts"));
    }

    #[test]
    fn test_missing_tsconfig_is_error() {
        let dir = tempdir().unwrap();
        let err = ProjectLoader::load(&dir.path().join("tsconfig.json")).unwrap_err();
        assert!(err.to_string().contains("Cannot find tsconfig"));
    }
}
