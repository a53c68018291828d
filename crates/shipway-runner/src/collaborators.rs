//! Process-backed docs and registry collaborators.
//!
//! Credentials are handed to the child process through its environment
//! and never written to argv, so they cannot show up in process lists.

use crate::command::run_shell;
use async_trait::async_trait;
use shipway_core::artifact::Artifact;
use shipway_core::credential::Credential;
use shipway_core::ports::{DocsBuilder, DocsHost, OutputTree, RegistryUploader, UploadOutcome};
use shipway_core::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

/// Docs builder that shells out to the configured build command
/// (e.g. `mkdocs build`) and reports the configured output directory.
pub struct CommandDocsBuilder {
    command: String,
    output_dir: PathBuf,
}

impl CommandDocsBuilder {
    pub fn new(command: impl Into<String>, output_dir: PathBuf) -> Self {
        Self {
            command: command.into(),
            output_dir,
        }
    }
}

#[async_trait]
impl DocsBuilder for CommandDocsBuilder {
    async fn build_docs(&self) -> Result<OutputTree> {
        let output = run_shell(&self.command, None, &HashMap::new()).await?;
        if !output.success() {
            return Err(Error::Internal(format!(
                "docs build exited with status {}: {}",
                output.exit_code,
                output.stderr_tail()
            )));
        }
        Ok(OutputTree {
            root: self.output_dir.clone(),
        })
    }
}

/// Docs host that shells out to a content-replacing push command
/// (e.g. `ghp-import --push --force --no-history`).
pub struct CommandDocsHost {
    command: String,
}

impl CommandDocsHost {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl DocsHost for CommandDocsHost {
    async fn push(
        &self,
        tree: &OutputTree,
        credential: &Credential,
        target_branch: &str,
    ) -> Result<()> {
        let mut envs = HashMap::new();
        envs.insert(
            "SHIPWAY_DOCS_DIR".to_string(),
            tree.root.display().to_string(),
        );
        envs.insert(
            "SHIPWAY_TARGET_BRANCH".to_string(),
            target_branch.to_string(),
        );
        envs.insert(
            "SHIPWAY_CREDENTIAL".to_string(),
            credential.expose().to_string(),
        );

        let output = run_shell(&self.command, None, &envs).await?;
        if !output.success() {
            return Err(Error::Internal(format!(
                "docs push exited with status {}: {}",
                output.exit_code,
                output.stderr_tail()
            )));
        }

        info!(branch = %target_branch, "Docs pushed");
        Ok(())
    }
}

/// Registry uploader that shells out to the configured upload command
/// (e.g. `twine upload`).
///
/// A zero exit whose output contains the configured duplicate marker
/// (twine prints "appears to already exist") is surfaced as
/// `AlreadyPublished`; the registry owns duplicate detection, this
/// adapter only relays what it reported.
pub struct CommandUploader {
    command: String,
    duplicate_marker: String,
}

impl CommandUploader {
    pub fn new(command: impl Into<String>, duplicate_marker: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            duplicate_marker: duplicate_marker.into().to_lowercase(),
        }
    }
}

#[async_trait]
impl RegistryUploader for CommandUploader {
    async fn upload(
        &self,
        artifact: &Artifact,
        credential: &Credential,
    ) -> Result<UploadOutcome> {
        let mut envs = HashMap::new();
        envs.insert(
            "SHIPWAY_ARTIFACT".to_string(),
            artifact.path.display().to_string(),
        );
        envs.insert(
            "SHIPWAY_CREDENTIAL".to_string(),
            credential.expose().to_string(),
        );

        let output = run_shell(&self.command, None, &envs).await?;
        if !output.success() {
            return Err(Error::Internal(format!(
                "upload exited with status {}: {}",
                output.exit_code,
                output.stderr_tail()
            )));
        }

        let combined = format!("{}\n{}", output.stdout, output.stderr).to_lowercase();
        if !self.duplicate_marker.is_empty() && combined.contains(&self.duplicate_marker) {
            info!(digest = %artifact.digest, "Registry reported artifact already published");
            return Ok(UploadOutcome::AlreadyPublished);
        }

        info!(digest = %artifact.digest, "Artifact uploaded");
        Ok(UploadOutcome::Uploaded)
    }
}
