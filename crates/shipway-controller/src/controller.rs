//! Pipeline controller.

use chrono::Utc;
use shipway_core::credential::PublishTarget;
use shipway_core::ids::RunId;
use shipway_core::report::{PipelineResult, UnitOutcome};
use shipway_core::trigger::TriggerEvent;
use shipway_core::variant::{BuildJob, VariantSpec};
use shipway_publish::{DocsDeployer, RegistryPublisher};
use shipway_runner::VariantRunner;
use shipway_scheduler::{MatrixExpander, TriggerFilter};
use shipway_secrets::CredentialScope;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Sequences one pipeline run.
///
/// The docs path and every build job run as independent concurrent
/// tasks. Each job publishes as soon as its own packaging finishes;
/// nothing waits for sibling jobs. Errors never cross task boundaries:
/// every unit's outcome is collected into the final result, and no unit
/// is retried automatically (a fresh run is the retry mechanism).
pub struct PipelineController {
    filter: TriggerFilter,
    expander: MatrixExpander,
    spec: VariantSpec,
    runner: Arc<VariantRunner>,
    publisher: Arc<RegistryPublisher>,
    deployer: Arc<DocsDeployer>,
    scope: Arc<CredentialScope>,
}

impl PipelineController {
    pub fn new(
        spec: VariantSpec,
        runner: Arc<VariantRunner>,
        publisher: Arc<RegistryPublisher>,
        deployer: Arc<DocsDeployer>,
        scope: Arc<CredentialScope>,
    ) -> Self {
        Self {
            filter: TriggerFilter::new(),
            expander: MatrixExpander::new(),
            spec,
            runner,
            publisher,
            deployer,
            scope,
        }
    }

    pub async fn run(&self, event: &TriggerEvent) -> PipelineResult {
        let run_id = RunId::new();

        if !self.filter.should_run(event) {
            info!(run_id = %run_id, ref_name = %event.ref_name, "Event did not match trigger policy, skipping");
            return PipelineResult::skipped_run(run_id, &event.ref_name);
        }

        let started_at = Utc::now();
        info!(run_id = %run_id, tag = %event.ref_name, "Pipeline run started");

        // Docs path starts immediately, independent of the matrix.
        let deployer = self.deployer.clone();
        let docs_scope = self.scope.clone();
        let docs_handle = tokio::spawn(async move {
            match docs_scope.credential(PublishTarget::Docs).await {
                Ok(credential) => match deployer.deploy(&credential).await {
                    Ok(()) => UnitOutcome::success("docs", None),
                    Err(e) => UnitOutcome::failure("docs", e.to_string()),
                },
                Err(e) => UnitOutcome::failure("docs", e.to_string()),
            }
        });

        let jobs = match self.expander.expand(&self.spec) {
            Ok(jobs) => jobs,
            Err(e) => {
                // Malformed spec kills the matrix path; the docs path
                // still runs to completion.
                warn!(run_id = %run_id, error = %e, "Matrix expansion failed");
                let docs = Self::join_unit(docs_handle, "docs").await;
                return PipelineResult {
                    run_id,
                    trigger_ref: event.ref_name.clone(),
                    skipped: false,
                    jobs: vec![UnitOutcome::failure("matrix", e.to_string())],
                    docs,
                    started_at,
                    completed_at: Utc::now(),
                };
            }
        };

        let mut set = JoinSet::new();
        for job in jobs {
            let runner = self.runner.clone();
            let publisher = self.publisher.clone();
            let scope = self.scope.clone();
            set.spawn(async move {
                let outcome = Self::run_variant(&runner, &publisher, &scope, &job).await;
                (job.index, outcome)
            });
        }

        let mut indexed: Vec<(usize, UnitOutcome)> = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(pair) => indexed.push(pair),
                Err(e) => indexed.push((
                    usize::MAX,
                    UnitOutcome::failure("job", format!("task panicked: {}", e)),
                )),
            }
        }
        // Report in matrix order regardless of completion order.
        indexed.sort_by_key(|(index, _)| *index);
        let job_outcomes: Vec<UnitOutcome> = indexed.into_iter().map(|(_, o)| o).collect();

        let docs = Self::join_unit(docs_handle, "docs").await;

        let result = PipelineResult {
            run_id,
            trigger_ref: event.ref_name.clone(),
            skipped: false,
            jobs: job_outcomes,
            docs,
            started_at,
            completed_at: Utc::now(),
        };

        info!(
            run_id = %run_id,
            success = result.is_success(),
            failed = result.failed_units().len(),
            "Pipeline run finished"
        );
        result
    }

    /// One job's full path: package, then immediately publish with a
    /// freshly scoped registry credential.
    async fn run_variant(
        runner: &VariantRunner,
        publisher: &RegistryPublisher,
        scope: &CredentialScope,
        job: &BuildJob,
    ) -> UnitOutcome {
        let artifact = match runner.run_job(job).await {
            Ok(artifact) => artifact,
            Err(e) => return UnitOutcome::failure(&job.display_name, e.to_string()),
        };

        let credential = match scope.credential(PublishTarget::Registry).await {
            Ok(credential) => credential,
            Err(e) => return UnitOutcome::failure(&job.display_name, e.to_string()),
        };

        match publisher.publish(&artifact, &credential).await {
            Ok(_) => UnitOutcome::success(&job.display_name, Some(artifact.digest)),
            Err(e) => UnitOutcome::failure(&job.display_name, e.to_string()),
        }
    }

    async fn join_unit(
        handle: tokio::task::JoinHandle<UnitOutcome>,
        unit: &str,
    ) -> UnitOutcome {
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => UnitOutcome::failure(unit, format!("task panicked: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shipway_core::artifact::Artifact;
    use shipway_core::credential::Credential;
    use shipway_core::ids::ArtifactId;
    use shipway_core::ports::{
        DocsBuilder, DocsHost, OutputTree, PackageBuilder, RegistryUploader, UploadOutcome,
    };
    use shipway_core::report::UnitStatus;
    use shipway_core::variant::Axis;
    use shipway_core::{Error, Result};
    use shipway_secrets::MemoryStore;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Builder that fails for configured runtime values and can delay
    /// others, recording what it built.
    struct ScriptedBuilder {
        fail_runtimes: Vec<String>,
        slow_runtimes: Vec<String>,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl PackageBuilder for ScriptedBuilder {
        async fn build(&self, job: &BuildJob) -> Result<Artifact> {
            let runtime = job.value("runtime").unwrap_or("").to_string();
            if self.slow_runtimes.contains(&runtime) {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            if self.fail_runtimes.contains(&runtime) {
                return Err(Error::Internal("compiler crashed".to_string()));
            }
            self.log.lock().unwrap().push(format!("built {}", runtime));
            Ok(Artifact {
                id: ArtifactId::new(),
                job: job.display_name.clone(),
                path: PathBuf::from(format!("dist/pkg-{}.whl", runtime)),
                digest: format!("digest-{}", runtime),
                produced_at: Utc::now(),
            })
        }
    }

    struct RecordingUploader {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RegistryUploader for RecordingUploader {
        async fn upload(
            &self,
            artifact: &Artifact,
            _credential: &Credential,
        ) -> Result<UploadOutcome> {
            self.log
                .lock()
                .unwrap()
                .push(format!("uploaded {}", artifact.digest));
            Ok(UploadOutcome::Uploaded)
        }
    }

    struct OkDocs;

    #[async_trait]
    impl DocsBuilder for OkDocs {
        async fn build_docs(&self) -> Result<OutputTree> {
            Ok(OutputTree {
                root: PathBuf::from("site"),
            })
        }
    }

    struct FailingDocs;

    #[async_trait]
    impl DocsBuilder for FailingDocs {
        async fn build_docs(&self) -> Result<OutputTree> {
            Err(Error::Internal("docs build broke".to_string()))
        }
    }

    struct OkHost;

    #[async_trait]
    impl DocsHost for OkHost {
        async fn push(
            &self,
            _tree: &OutputTree,
            _credential: &Credential,
            _target_branch: &str,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn spec(runtimes: &[&str]) -> VariantSpec {
        VariantSpec {
            axes: vec![
                Axis {
                    name: "runtime".to_string(),
                    values: runtimes.iter().map(|v| v.to_string()).collect(),
                },
                Axis {
                    name: "format".to_string(),
                    values: vec!["wheel".to_string()],
                },
            ],
            exclude: vec![],
            augment: vec![],
        }
    }

    fn secrets() -> Arc<MemoryStore> {
        let mut map = HashMap::new();
        map.insert("REGISTRY_TOKEN".to_string(), "registry-secret".to_string());
        map.insert("DOCS_TOKEN".to_string(), "docs-secret".to_string());
        Arc::new(MemoryStore::from_map(map))
    }

    fn controller(
        spec: VariantSpec,
        builder: ScriptedBuilder,
        docs_ok: bool,
        log: Arc<Mutex<Vec<String>>>,
    ) -> PipelineController {
        let scope = Arc::new(CredentialScope::new(
            secrets(),
            "REGISTRY_TOKEN",
            "DOCS_TOKEN",
        ));
        let docs_builder: Arc<dyn DocsBuilder> = if docs_ok {
            Arc::new(OkDocs)
        } else {
            Arc::new(FailingDocs)
        };
        PipelineController::new(
            spec,
            Arc::new(VariantRunner::new(Arc::new(builder))),
            Arc::new(RegistryPublisher::new(Arc::new(RecordingUploader { log }))),
            Arc::new(DocsDeployer::new(docs_builder, Arc::new(OkHost), "gh-pages")),
            scope,
        )
    }

    fn quiet_builder(log: &Arc<Mutex<Vec<String>>>) -> ScriptedBuilder {
        ScriptedBuilder {
            fail_runtimes: vec![],
            slow_runtimes: vec![],
            log: log.clone(),
        }
    }

    #[tokio::test]
    async fn test_branch_event_is_skipped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let controller = controller(spec(&["3.13"]), quiet_builder(&log), true, log.clone());

        let result = controller.run(&TriggerEvent::branch("main")).await;
        assert!(result.skipped);
        assert!(result.jobs.is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_job_does_not_contaminate_siblings() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let builder = ScriptedBuilder {
            fail_runtimes: vec!["3.12".to_string()],
            slow_runtimes: vec![],
            log: log.clone(),
        };
        let controller = controller(spec(&["3.12", "3.13"]), builder, true, log.clone());

        let result = controller.run(&TriggerEvent::tag("v1.0.0")).await;
        assert!(!result.is_success());
        assert_eq!(result.jobs.len(), 2);
        assert_eq!(result.jobs[0].status, UnitStatus::Failure);
        assert_eq!(result.jobs[1].status, UnitStatus::Success);
        assert_eq!(
            result.jobs[1].artifact_digest.as_deref(),
            Some("digest-3.13")
        );
        assert_eq!(result.docs.status, UnitStatus::Success);
    }

    #[tokio::test]
    async fn test_docs_failure_fails_run_but_not_jobs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let controller = controller(spec(&["3.13"]), quiet_builder(&log), false, log.clone());

        let result = controller.run(&TriggerEvent::tag("v1.0.0")).await;
        assert!(!result.is_success());
        assert_eq!(result.docs.status, UnitStatus::Failure);
        assert!(result.jobs.iter().all(|j| j.status == UnitStatus::Success));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_publish_does_not_wait_for_sibling_packaging() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let builder = ScriptedBuilder {
            fail_runtimes: vec![],
            slow_runtimes: vec!["slow".to_string()],
            log: log.clone(),
        };
        let controller = controller(spec(&["fast", "slow"]), builder, true, log.clone());

        let result = controller.run(&TriggerEvent::tag("v1.0.0")).await;
        assert!(result.is_success());

        let events = log.lock().unwrap().clone();
        let fast_upload = events
            .iter()
            .position(|e| e == "uploaded digest-fast")
            .unwrap();
        let slow_build = events.iter().position(|e| e == "built slow").unwrap();
        assert!(
            fast_upload < slow_build,
            "fast variant should publish before slow variant finishes packaging: {events:?}"
        );
    }

    #[tokio::test]
    async fn test_missing_registry_credential_fails_jobs_only() {
        let mut map = HashMap::new();
        map.insert("DOCS_TOKEN".to_string(), "docs-secret".to_string());
        let scope = Arc::new(CredentialScope::new(
            Arc::new(MemoryStore::from_map(map)),
            "REGISTRY_TOKEN",
            "DOCS_TOKEN",
        ));

        let log = Arc::new(Mutex::new(Vec::new()));
        let controller = PipelineController::new(
            spec(&["3.13"]),
            Arc::new(VariantRunner::new(Arc::new(quiet_builder(&log)))),
            Arc::new(RegistryPublisher::new(Arc::new(RecordingUploader {
                log: log.clone(),
            }))),
            Arc::new(DocsDeployer::new(Arc::new(OkDocs), Arc::new(OkHost), "gh-pages")),
            scope,
        );

        let result = controller.run(&TriggerEvent::tag("v1.0.0")).await;
        assert!(!result.is_success());
        assert_eq!(result.jobs[0].status, UnitStatus::Failure);
        assert!(result.jobs[0]
            .error
            .as_deref()
            .unwrap()
            .contains("missing credential"));
        assert_eq!(result.docs.status, UnitStatus::Success);
    }

    #[tokio::test]
    async fn test_malformed_spec_fails_matrix_path_only() {
        let mut bad = spec(&["3.13"]);
        bad.exclude.push(
            [("os".to_string(), "linux".to_string())]
                .into_iter()
                .collect(),
        );

        let log = Arc::new(Mutex::new(Vec::new()));
        let controller = controller(bad, quiet_builder(&log), true, log.clone());

        let result = controller.run(&TriggerEvent::tag("v1.0.0")).await;
        assert!(!result.is_success());
        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.jobs[0].unit, "matrix");
        assert_eq!(result.docs.status, UnitStatus::Success);
    }
}
