//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the orchestrator and its
//! external collaborators: the packaging tool, the docs builder, the
//! registry upload mechanism, and the docs hosting mechanism.

use crate::artifact::Artifact;
use crate::credential::Credential;
use crate::variant::BuildJob;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Static output tree produced by the docs builder.
#[derive(Debug, Clone)]
pub struct OutputTree {
    pub root: PathBuf,
}

/// What the registry reported for an upload.
///
/// `AlreadyPublished` is a success: the registry guarantees idempotence
/// for an identical artifact identity, and the orchestrator surfaces
/// that outcome rather than detecting duplicates itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    AlreadyPublished,
}

/// Packaging collaborator: produces one artifact per build job.
#[async_trait]
pub trait PackageBuilder: Send + Sync {
    async fn build(&self, job: &BuildJob) -> Result<Artifact>;
}

/// Documentation-build collaborator.
#[async_trait]
pub trait DocsBuilder: Send + Sync {
    async fn build_docs(&self) -> Result<OutputTree>;
}

/// Registry upload collaborator. Must be idempotent on duplicate
/// identical artifact identity.
#[async_trait]
pub trait RegistryUploader: Send + Sync {
    async fn upload(&self, artifact: &Artifact, credential: &Credential)
        -> Result<UploadOutcome>;
}

/// Docs hosting collaborator: replaces the target branch's content with
/// the given tree.
#[async_trait]
pub trait DocsHost: Send + Sync {
    async fn push(
        &self,
        tree: &OutputTree,
        credential: &Credential,
        target_branch: &str,
    ) -> Result<()>;
}
