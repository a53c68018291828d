//! No-op collaborators for dry runs.

use async_trait::async_trait;
use shipway_core::artifact::Artifact;
use shipway_core::credential::Credential;
use shipway_core::ports::{DocsHost, OutputTree, RegistryUploader, UploadOutcome};
use shipway_core::Result;
use tracing::info;

/// Uploader that records what would have been uploaded.
pub struct RecordingUploader;

#[async_trait]
impl RegistryUploader for RecordingUploader {
    async fn upload(
        &self,
        artifact: &Artifact,
        _credential: &Credential,
    ) -> Result<UploadOutcome> {
        info!(
            job = %artifact.job,
            path = %artifact.path.display(),
            digest = %artifact.digest,
            "[dry-run] would upload artifact"
        );
        Ok(UploadOutcome::Uploaded)
    }
}

/// Docs host that records what would have been pushed.
pub struct NullDocsHost;

#[async_trait]
impl DocsHost for NullDocsHost {
    async fn push(
        &self,
        tree: &OutputTree,
        _credential: &Credential,
        target_branch: &str,
    ) -> Result<()> {
        info!(
            tree = %tree.root.display(),
            branch = %target_branch,
            "[dry-run] would push docs"
        );
        Ok(())
    }
}
