//! Variant job runner.

use shipway_core::artifact::Artifact;
use shipway_core::ports::PackageBuilder;
use shipway_core::variant::BuildJob;
use shipway_core::{Error, Result};
use std::sync::Arc;
use tracing::{error, info};

/// Runs one build-and-package job for one matrix cell.
///
/// Invokes the packaging collaborator exactly once per job. Any failure
/// is wrapped as a build error carrying the job's display name; sibling
/// jobs share no state with this one and are never affected.
pub struct VariantRunner {
    builder: Arc<dyn PackageBuilder>,
}

impl VariantRunner {
    pub fn new(builder: Arc<dyn PackageBuilder>) -> Self {
        Self { builder }
    }

    pub async fn run_job(&self, job: &BuildJob) -> Result<Artifact> {
        info!(job = %job.display_name, "Packaging variant");

        match self.builder.build(job).await {
            Ok(artifact) => {
                info!(job = %job.display_name, digest = %artifact.digest, "Variant packaged");
                Ok(artifact)
            }
            Err(e) => {
                error!(job = %job.display_name, error = %e, "Packaging failed");
                Err(Error::Build {
                    job: job.display_name.clone(),
                    cause: e.to_string(),
                })
            }
        }
    }
}
