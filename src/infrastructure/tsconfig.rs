//! tsconfig.json Reader
//!
//! tsconfig files are JSON with comments and trailing commas, which JSON5
//! accepts. Relative `extends` bases are followed; their compiler options
//! are inherited.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// Longest `extends` chain followed before giving up.
const MAX_EXTENDS: usize = 16;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TsConfig {
    pub extends: Option<Extends>,
    pub files: Option<Vec<String>>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn bases(&self) -> Vec<&str> {
        match self {
            Extends::One(base) => vec![base.as_str()],
            Extends::Many(bases) => bases.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    pub base_url: Option<String>,
    pub paths: BTreeMap<String, Vec<String>>,
}

impl TsConfig {
    /// Read `path` and everything it extends.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_chain(path, 0)
    }

    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(json5::from_str(text)?)
    }

    fn load_chain(path: &Path, depth: usize) -> Result<Self> {
        if depth > MAX_EXTENDS {
            bail!("tsconfig extends chain too deep at {}", path.display());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tsconfig {}", path.display()))?;
        let mut config =
            Self::parse(&text).with_context(|| format!("Invalid tsconfig {}", path.display()))?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        // Settings from several configs meet here, so anchor baseUrl now.
        if let Some(base_url) = &config.compiler_options.base_url {
            config.compiler_options.base_url = Some(dir.join(base_url).display().to_string());
        }

        let Some(extends) = config.extends.take() else {
            return Ok(config);
        };
        for base in extends.bases() {
            let Some(base_path) = base_config_path(dir, base) else {
                warn!(
                    tsconfig = %path.display(),
                    extends = base,
                    "Package tsconfig bases are not followed; their settings are ignored"
                );
                continue;
            };
            debug!(base = %base_path.display(), "Following tsconfig extends");
            let parent = Self::load_chain(&base_path, depth + 1)?;
            let same_dir = base_path.parent() == Some(dir);
            config.inherit(parent, same_dir, &base_path);
        }
        Ok(config)
    }

    /// Fill settings this config leaves unset from `base`.
    fn inherit(&mut self, base: TsConfig, same_dir: bool, base_path: &Path) {
        if self.compiler_options.base_url.is_none() {
            self.compiler_options.base_url = base.compiler_options.base_url;
        }
        if self.compiler_options.paths.is_empty() {
            self.compiler_options.paths = base.compiler_options.paths;
        }

        let has_file_lists = base.files.is_some() || base.include.is_some() || base.exclude.is_some();
        if !same_dir {
            if has_file_lists {
                warn!(
                    base = %base_path.display(),
                    "files/include/exclude from a tsconfig in another directory are ignored"
                );
            }
            return;
        }
        if self.files.is_none() {
            self.files = base.files;
        }
        if self.include.is_none() {
            self.include = base.include;
        }
        if self.exclude.is_none() {
            self.exclude = base.exclude;
        }
    }
}

/// Path of a relative `extends` entry, with `.json` added when missing.
/// Package specifiers yield `None`.
fn base_config_path(dir: &Path, base: &str) -> Option<PathBuf> {
    let is_path = base.starts_with("./") || base.starts_with("../") || Path::new(base).is_absolute();
    if !is_path {
        return None;
    }
    let path = dir.join(base);
    if !base.ends_with(".json") && !path.is_file() {
        return Some(dir.join(format!("{base}.json")));
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_with_comments_and_trailing_commas() {
        let text = r#"
        {
            // project settings
            "compilerOptions": {
                "baseUrl": "./src", /* resolved against tsconfig dir */
                "paths": { "@app/*": ["app/*"], }, // aliases
            },
            "include": ["src/**/*"],
        }
        "#;
        let config = TsConfig::parse(text).unwrap();
        assert_eq!(config.include, Some(vec!["src/**/*".to_string()]));
        assert_eq!(config.compiler_options.base_url.as_deref(), Some("./src"));
        assert_eq!(
            config.compiler_options.paths.get("@app/*"),
            Some(&vec!["app/*".to_string()])
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = TsConfig::parse("  \n").unwrap();
        assert!(config.files.is_none());
        assert!(config.compiler_options.paths.is_empty());
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(TsConfig::parse("{ \"include\": [ }").is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = TsConfig::parse(r#"{"compilerOptions": {"strict": true}}"#).unwrap();
        assert!(config.compiler_options.base_url.is_none());
    }

    #[test]
    fn test_extends_inherits_unset_settings() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("config")).unwrap();
        fs::write(
            root.join("tsconfig.base.json"),
            r#"{ "include": ["src"], "compilerOptions": { "paths": { "@x/*": ["x/*"] } } }"#,
        )
        .unwrap();
        fs::write(
            root.join("config/shared.json"),
            r#"{ "compilerOptions": { "baseUrl": "../lib" }, "exclude": ["gen"] }"#,
        )
        .unwrap();
        fs::write(
            root.join("tsconfig.json"),
            r#"{
                // later bases fill what earlier ones left unset
                "extends": ["./tsconfig.base", "./config/shared.json", "@tsconfig/node20"],
                "exclude": ["dist"],
            }"#,
        )
        .unwrap();

        let config = TsConfig::load(&root.join("tsconfig.json")).unwrap();

        assert_eq!(config.include, Some(vec!["src".to_string()]));
        assert_eq!(config.exclude, Some(vec!["dist".to_string()]));
        assert_eq!(
            config.compiler_options.paths.get("@x/*"),
            Some(&vec!["x/*".to_string()])
        );
        let base_url = PathBuf::from(config.compiler_options.base_url.unwrap());
        assert_eq!(base_url, root.join("config").join("../lib"));
    }

    #[test]
    fn test_extends_cycle_is_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();

        let err = TsConfig::load(&dir.path().join("a.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("extends chain too deep"));
    }
}
