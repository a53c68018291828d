//! Release configuration surface.

use crate::variant::VariantSpec;
use crate::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Declarative configuration for one release pipeline, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReleaseConfig {
    pub project: String,
    pub matrix: VariantSpec,
    #[serde(default)]
    pub packaging: PackagingConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PackagingConfig {
    /// Shell command that builds one variant. Axis values and metadata
    /// are exported as `SHIPWAY_*` environment variables; the command
    /// must print the produced artifact's path as its last stdout line.
    #[serde(default = "default_packaging_command")]
    pub command: String,
    #[serde(default)]
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocsConfig {
    #[serde(default = "default_target_branch")]
    pub target_branch: String,
    #[serde(default = "default_docs_build_command")]
    pub build_command: String,
    /// Directory the docs build writes its static output tree to.
    #[serde(default = "default_docs_output_dir")]
    pub output_dir: PathBuf,
    /// Command that replaces the target branch's content with the built
    /// tree. Receives `SHIPWAY_DOCS_DIR` and `SHIPWAY_TARGET_BRANCH`.
    #[serde(default = "default_docs_push_command")]
    pub push_command: String,
    #[serde(default = "default_docs_secret_key")]
    pub secret_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegistryConfig {
    /// Command that uploads one artifact. Receives `SHIPWAY_ARTIFACT`.
    #[serde(default = "default_upload_command")]
    pub upload_command: String,
    /// Marker the upload tool prints when the registry reports the
    /// artifact as an already-existing duplicate (e.g. twine's
    /// "appears to already exist").
    #[serde(default = "default_duplicate_marker")]
    pub duplicate_marker: String,
    #[serde(default = "default_registry_secret_key")]
    pub secret_key: String,
}

fn default_packaging_command() -> String {
    "python -m build".to_string()
}

fn default_target_branch() -> String {
    "gh-pages".to_string()
}

fn default_docs_build_command() -> String {
    "mkdocs build".to_string()
}

fn default_docs_output_dir() -> PathBuf {
    PathBuf::from("site")
}

fn default_docs_push_command() -> String {
    "ghp-import --push --force --no-history site".to_string()
}

fn default_docs_secret_key() -> String {
    "DOCS_TOKEN".to_string()
}

fn default_upload_command() -> String {
    "twine upload".to_string()
}

fn default_duplicate_marker() -> String {
    "already exist".to_string()
}

fn default_registry_secret_key() -> String {
    "REGISTRY_TOKEN".to_string()
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            command: default_packaging_command(),
            workdir: None,
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            target_branch: default_target_branch(),
            build_command: default_docs_build_command(),
            output_dir: default_docs_output_dir(),
            push_command: default_docs_push_command(),
            secret_key: default_docs_secret_key(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            upload_command: default_upload_command(),
            duplicate_marker: default_duplicate_marker(),
            secret_key: default_registry_secret_key(),
        }
    }
}

impl ReleaseConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.matrix.validate()
    }
}
