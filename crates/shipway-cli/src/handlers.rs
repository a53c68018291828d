//! Command handlers.

use crate::commands::RefKindArg;
use crate::dry_run::{NullDocsHost, RecordingUploader};
use anyhow::Context;
use shipway_controller::PipelineController;
use shipway_core::config::ReleaseConfig;
use shipway_core::ports::{DocsBuilder, DocsHost, RegistryUploader};
use shipway_core::report::{PipelineResult, UnitOutcome, UnitStatus};
use shipway_core::trigger::TriggerEvent;
use shipway_publish::{DocsDeployer, RegistryPublisher};
use shipway_runner::{
    CommandBuilder, CommandDocsBuilder, CommandDocsHost, CommandUploader, VariantRunner,
};
use shipway_scheduler::MatrixExpander;
use shipway_secrets::{CredentialScope, EnvStore, MemoryStore, SecretStore};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub async fn run(
    config_path: &Path,
    ref_kind: RefKindArg,
    ref_name: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let config = ReleaseConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let event = TriggerEvent {
        ref_kind: ref_kind.into(),
        ref_name: ref_name.to_string(),
    };
    if let Some(version) = event.version() {
        tracing::info!(project = %config.project, version, "Releasing");
    }

    let controller = build_controller(&config, dry_run);
    let result = controller.run(&event).await;

    print_result(&result);

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

pub fn validate(config_path: &Path) -> anyhow::Result<()> {
    let config = ReleaseConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let jobs = MatrixExpander::new().expand(&config.matrix)?;
    println!("{}: {} build jobs", config.project, jobs.len());
    for job in &jobs {
        if job.metadata.is_empty() {
            println!("  {}", job.display_name);
        } else {
            let extras: Vec<String> = job
                .metadata
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            println!("  {} [{}]", job.display_name, extras.join(", "));
        }
    }
    println!("docs -> {}", config.docs.target_branch);
    Ok(())
}

fn build_controller(config: &ReleaseConfig, dry_run: bool) -> PipelineController {
    let store: Arc<dyn SecretStore> = if dry_run {
        // Dry runs must not require real secrets.
        let mut map = HashMap::new();
        map.insert(config.registry.secret_key.clone(), "dry-run".to_string());
        map.insert(config.docs.secret_key.clone(), "dry-run".to_string());
        Arc::new(MemoryStore::from_map(map))
    } else {
        Arc::new(EnvStore::default())
    };
    let scope = Arc::new(CredentialScope::new(
        store,
        &config.registry.secret_key,
        &config.docs.secret_key,
    ));

    let runner = Arc::new(VariantRunner::new(Arc::new(CommandBuilder::new(
        &config.packaging.command,
        config.packaging.workdir.clone(),
    ))));

    let uploader: Arc<dyn RegistryUploader> = if dry_run {
        Arc::new(RecordingUploader)
    } else {
        Arc::new(CommandUploader::new(
            &config.registry.upload_command,
            &config.registry.duplicate_marker,
        ))
    };
    let publisher = Arc::new(RegistryPublisher::new(uploader));

    let docs_builder: Arc<dyn DocsBuilder> = Arc::new(CommandDocsBuilder::new(
        &config.docs.build_command,
        config.docs.output_dir.clone(),
    ));
    let docs_host: Arc<dyn DocsHost> = if dry_run {
        Arc::new(NullDocsHost)
    } else {
        Arc::new(CommandDocsHost::new(&config.docs.push_command))
    };
    let deployer = Arc::new(DocsDeployer::new(
        docs_builder,
        docs_host,
        &config.docs.target_branch,
    ));

    PipelineController::new(config.matrix.clone(), runner, publisher, deployer, scope)
}

fn print_result(result: &PipelineResult) {
    if result.skipped {
        println!("{}: not a tag, pipeline skipped", result.trigger_ref);
        return;
    }

    let verdict = if result.is_success() { "success" } else { "FAILED" };
    println!("{} ({}): {}", result.trigger_ref, result.run_id, verdict);

    let width = result
        .jobs
        .iter()
        .map(|j| j.unit.len())
        .chain(std::iter::once(result.docs.unit.len()))
        .max()
        .unwrap_or(0);

    for outcome in result.jobs.iter().chain(std::iter::once(&result.docs)) {
        print_unit(outcome, width);
    }
}

fn print_unit(outcome: &UnitOutcome, width: usize) {
    let status = match outcome.status {
        UnitStatus::Success => "success",
        UnitStatus::Failure => "failure",
        UnitStatus::Skipped => "skipped",
    };
    match &outcome.error {
        Some(error) => println!("  {:width$}  {}  {}", outcome.unit, status, error),
        None => println!("  {:width$}  {}", outcome.unit, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_reports_expansion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            br#"
project: demo
matrix:
  axes:
    - name: runtime
      values: ["3.12", "3.13"]
    - name: format
      values: [sdist, wheel]
  exclude:
    - runtime: "3.12"
      format: sdist
"#,
        )
        .unwrap();

        validate(&path).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"project: demo\nmatrix:\n  axes:\n    - name: a\n      values: [x]\n  exclude:\n    - nope: y\n")
            .unwrap();

        assert!(validate(&path).is_err());
    }
}
