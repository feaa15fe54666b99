//! Module specifier resolution.
//!
//! Maps `import ... from "<specifier>"` to a file on disk: relative paths,
//! tsconfig `paths`/`baseUrl` aliases, then `node_modules` packages
//! (including `@types`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::trace;

use crate::domain::language::Language;
use crate::infrastructure::tsconfig::CompilerOptions;

const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.d.ts", "index.js"];
const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx"];

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    types: Option<String>,
    typings: Option<String>,
    main: Option<String>,
}

impl PackageManifest {
    fn entry_points(&self) -> impl Iterator<Item = &str> {
        [&self.types, &self.typings, &self.main]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct ModuleResolver {
    base_url: Option<PathBuf>,
    /// `paths` patterns, most specific (longest prefix) first.
    paths: Vec<(String, Vec<String>)>,
    project_root: PathBuf,
}

impl ModuleResolver {
    pub fn new(project_root: &Path, options: &CompilerOptions) -> Self {
        let base_url = options.base_url.as_ref().map(|b| project_root.join(b));
        let mut paths: Vec<(String, Vec<String>)> = options
            .paths
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        paths.sort_by_key(|(pattern, _)| {
            std::cmp::Reverse(pattern.split('*').next().map(str::len).unwrap_or(0))
        });
        Self {
            base_url,
            paths,
            project_root: project_root.to_path_buf(),
        }
    }

    /// Resolve `specifier` as imported from `from_file`. Returns a canonical path.
    pub fn resolve(&self, from_file: &Path, specifier: &str) -> Option<PathBuf> {
        let from_dir = from_file.parent().unwrap_or(Path::new("."));

        let resolved = if is_relative(specifier) {
            resolve_file(&from_dir.join(specifier))
        } else {
            self.resolve_alias(specifier)
                .or_else(|| resolve_package(from_dir, specifier))
        };

        trace!(from = %from_file.display(), specifier, resolved = ?resolved, "Resolved module");
        resolved.and_then(|p| fs::canonicalize(p).ok())
    }

    fn resolve_alias(&self, specifier: &str) -> Option<PathBuf> {
        let alias_root = self.base_url.as_deref().unwrap_or(&self.project_root);

        for (pattern, targets) in &self.paths {
            let Some(matched) = match_pattern(pattern, specifier) else {
                continue;
            };
            for target in targets {
                let candidate = alias_root.join(target.replace('*', matched));
                if let Some(found) = resolve_file(&candidate) {
                    return Some(found);
                }
            }
        }

        let base_url = self.base_url.as_ref()?;
        resolve_file(&base_url.join(specifier))
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// The text matched by `*` in a `paths` pattern, or "" for an exact match.
fn match_pattern<'a>(pattern: &str, specifier: &'a str) -> Option<&'a str> {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            if specifier.len() < prefix.len() + suffix.len() {
                return None;
            }
            specifier
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
        }
        None => (pattern == specifier).then_some(""),
    }
}

/// Try `base` as a file (adding or swapping extensions), then as a directory.
fn resolve_file(base: &Path) -> Option<PathBuf> {
    let has_known_extension = base
        .extension()
        .and_then(|e| e.to_str())
        .and_then(Language::from_extension)
        .is_some();

    // `./x.js` in TypeScript sources refers to `./x.ts`.
    if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
        if SCRIPT_EXTENSIONS.contains(&ext) {
            let stem = base.with_extension("");
            for swapped in ["ts", "tsx", "d.ts"] {
                let candidate = append_extension(&stem, swapped);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
    }

    if has_known_extension && base.is_file() {
        return Some(base.to_path_buf());
    }

    for ext in Language::resolution_extensions() {
        let candidate = append_extension(base, ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    if base.is_dir() {
        return resolve_directory(base);
    }
    None
}

fn resolve_directory(dir: &Path) -> Option<PathBuf> {
    if let Some(manifest) = read_manifest(dir) {
        for entry in manifest.entry_points() {
            let candidate = dir.join(entry);
            if candidate == dir {
                continue;
            }
            if let Some(found) = resolve_file(&candidate) {
                return Some(found);
            }
        }
    }
    INDEX_FILES
        .iter()
        .map(|index| dir.join(index))
        .find(|candidate| candidate.is_file())
}

fn read_manifest(dir: &Path) -> Option<PackageManifest> {
    let text = fs::read_to_string(dir.join("package.json")).ok()?;
    serde_json::from_str(&text).ok()
}

/// Look for the package in every `node_modules` from `from_dir` up to the
/// filesystem root.
fn resolve_package(from_dir: &Path, specifier: &str) -> Option<PathBuf> {
    let (package, subpath) = split_package(specifier)?;
    let types_package = match package.strip_prefix('@') {
        Some(scoped) => scoped.replacen('/', "__", 1),
        None => package.to_string(),
    };

    for dir in from_dir.ancestors() {
        let node_modules = dir.join("node_modules");
        if !node_modules.is_dir() {
            continue;
        }
        for package_dir in [
            node_modules.join(package),
            node_modules.join("@types").join(&types_package),
        ] {
            if !package_dir.is_dir() {
                continue;
            }
            let found = match subpath {
                Some(sub) => resolve_file(&package_dir.join(sub)),
                None => resolve_directory(&package_dir),
            };
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

/// `@scope/name/sub/path` → (`@scope/name`, Some(`sub/path`)).
fn split_package(specifier: &str) -> Option<(&str, Option<&str>)> {
    let segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut end = 0;
    for (count, (idx, _)) in specifier.match_indices('/').enumerate() {
        if count + 1 == segments {
            end = idx;
            break;
        }
    }
    if end == 0 {
        if segments == 2 && !specifier.contains('/') {
            return None;
        }
        return Some((specifier, None));
    }
    let subpath = &specifier[end + 1..];
    Some((&specifier[..end], (!subpath.is_empty()).then_some(subpath)))
}

fn append_extension(base: &Path, ext: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}
