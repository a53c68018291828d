//! Registry publishing.

use shipway_core::artifact::Artifact;
use shipway_core::credential::{Credential, PublishTarget};
use shipway_core::ports::{RegistryUploader, UploadOutcome};
use shipway_core::{Error, Result};
use std::sync::Arc;
use tracing::{error, info};

/// Uploads one artifact to the package registry.
///
/// Failures are tagged with the owning job and isolated to that job's
/// branch of the pipeline. Duplicate identical artifacts are the
/// registry's concern; its `AlreadyPublished` report is a success here.
pub struct RegistryPublisher {
    uploader: Arc<dyn RegistryUploader>,
}

impl RegistryPublisher {
    pub fn new(uploader: Arc<dyn RegistryUploader>) -> Self {
        Self { uploader }
    }

    pub async fn publish(
        &self,
        artifact: &Artifact,
        credential: &Credential,
    ) -> Result<UploadOutcome> {
        if credential.target != PublishTarget::Registry {
            return Err(Error::Configuration(format!(
                "registry publish given a {} credential",
                credential.target
            )));
        }

        info!(job = %artifact.job, digest = %artifact.digest, "Publishing artifact");

        match self.uploader.upload(artifact, credential).await {
            Ok(outcome) => {
                info!(job = %artifact.job, ?outcome, "Publish complete");
                Ok(outcome)
            }
            Err(e) => {
                error!(job = %artifact.job, error = %e, "Publish failed");
                Err(Error::Publish {
                    job: artifact.job.clone(),
                    cause: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use shipway_core::ids::ArtifactId;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Uploader that remembers seen digests, mimicking the registry's
    /// idempotence contract.
    struct FakeRegistry {
        seen: Mutex<HashSet<String>>,
        reject: bool,
    }

    impl FakeRegistry {
        fn new() -> Self {
            Self {
                seen: Mutex::new(HashSet::new()),
                reject: false,
            }
        }

        fn rejecting() -> Self {
            Self {
                seen: Mutex::new(HashSet::new()),
                reject: true,
            }
        }
    }

    #[async_trait]
    impl RegistryUploader for FakeRegistry {
        async fn upload(
            &self,
            artifact: &Artifact,
            _credential: &Credential,
        ) -> Result<UploadOutcome> {
            if self.reject {
                return Err(Error::Internal("403 invalid credentials".to_string()));
            }
            let mut seen = self.seen.lock().unwrap();
            if seen.insert(artifact.digest.clone()) {
                Ok(UploadOutcome::Uploaded)
            } else {
                Ok(UploadOutcome::AlreadyPublished)
            }
        }
    }

    fn artifact(digest: &str) -> Artifact {
        Artifact {
            id: ArtifactId::new(),
            job: "runtime=3.13, format=wheel".to_string(),
            path: PathBuf::from("dist/pkg.whl"),
            digest: digest.to_string(),
            produced_at: Utc::now(),
        }
    }

    fn credential() -> Credential {
        Credential::new(PublishTarget::Registry, "REGISTRY_TOKEN", "secret")
    }

    #[tokio::test]
    async fn test_republish_same_identity_is_success() {
        let publisher = RegistryPublisher::new(Arc::new(FakeRegistry::new()));
        let artifact = artifact("abc123");

        let first = publisher.publish(&artifact, &credential()).await.unwrap();
        assert_eq!(first, UploadOutcome::Uploaded);

        let second = publisher.publish(&artifact, &credential()).await.unwrap();
        assert_eq!(second, UploadOutcome::AlreadyPublished);
    }

    #[tokio::test]
    async fn test_rejection_is_publish_error_tagged_with_job() {
        let publisher = RegistryPublisher::new(Arc::new(FakeRegistry::rejecting()));
        let err = publisher
            .publish(&artifact("abc123"), &credential())
            .await
            .unwrap_err();
        match err {
            Error::Publish { job, cause } => {
                assert_eq!(job, "runtime=3.13, format=wheel");
                assert!(cause.contains("403"));
            }
            other => panic!("expected publish error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_docs_credential_is_refused() {
        let publisher = RegistryPublisher::new(Arc::new(FakeRegistry::new()));
        let docs_credential = Credential::new(PublishTarget::Docs, "DOCS_TOKEN", "secret");
        let err = publisher
            .publish(&artifact("abc123"), &docs_credential)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
