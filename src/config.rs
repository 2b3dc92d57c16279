use anyhow::{Context, Result};
use ink_parse::AssembleOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the project root when `--config` is not given.
pub const CONFIG_FILE: &str = "inkpost.json";

/// Top-level inkpost.json schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkConfig {
    #[serde(default = "default_posts_dir")]
    pub posts_dir: String,

    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,

    #[serde(default)]
    pub default_category: Option<String>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_posts_dir() -> String {
    "posts".to_string()
}
fn default_out_dir() -> String {
    "dist".to_string()
}
fn default_link_prefix() -> String {
    AssembleOptions::default().link_prefix
}
fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

impl Default for InkConfig {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
            out_dir: default_out_dir(),
            link_prefix: default_link_prefix(),
            default_category: None,
            extensions: default_extensions(),
        }
    }
}

impl InkConfig {
    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            link_prefix: self.link_prefix.clone(),
            default_category: self.default_category.clone(),
        }
    }

    /// Whether `path` has one of the configured document extensions.
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }
}

/// A loaded config together with the directory its relative paths resolve
/// against.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: InkConfig,
}

impl Project {
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(&self.config.posts_dir)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.config.out_dir)
    }
}

/// Load the project config.
///
/// An explicit path must exist. Without one, `inkpost.json` in the current
/// directory is used if present, otherwise defaults apply.
pub fn load_project(explicit: Option<&Path>) -> Result<Project> {
    match explicit {
        Some(path) => {
            let config = read_config(path)?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok(Project { root, config })
        }
        None => {
            let root = std::env::current_dir()?;
            let config_path = root.join(CONFIG_FILE);
            let config = if config_path.exists() {
                read_config(&config_path)?
            } else {
                InkConfig::default()
            };
            Ok(Project { root, config })
        }
    }
}

fn read_config(path: &Path) -> Result<InkConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: InkConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
