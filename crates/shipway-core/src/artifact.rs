//! Packaged build outputs.

use crate::ids::ArtifactId;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The packaged output of one build job.
///
/// The sha256 digest is the artifact's identity at the registry
/// boundary: uploading the same digest twice is the registry's
/// idempotence contract, not something the orchestrator re-checks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Artifact {
    pub id: ArtifactId,
    /// Display name of the job that produced this artifact.
    pub job: String,
    pub path: PathBuf,
    pub digest: String,
    pub produced_at: DateTime<Utc>,
}

impl Artifact {
    pub fn identity(&self) -> &str {
        &self.digest
    }
}
