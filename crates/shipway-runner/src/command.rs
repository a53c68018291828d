//! Process-backed packaging collaborator.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shipway_core::artifact::Artifact;
use shipway_core::ids::ArtifactId;
use shipway_core::ports::PackageBuilder;
use shipway_core::variant::BuildJob;
use shipway_core::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Captured output of a finished shell command.
pub(crate) struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last few stderr lines, for error messages.
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.lines().rev().take(5).collect();
        lines.into_iter().rev().collect::<Vec<_>>().join("\n")
    }
}

/// Run a shell command with extra environment, capturing output.
pub(crate) async fn run_shell(
    command: &str,
    workdir: Option<&Path>,
    envs: &HashMap<String, String>,
) -> Result<CommandOutput> {
    debug!(command = %command, "Spawning shell command");

    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .envs(envs)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| Error::Internal(format!("Failed to spawn process: {}", e)))?;

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Environment variables describing one build job: axis values as
/// `SHIPWAY_<AXIS>` and augmentation metadata as `SHIPWAY_META_<KEY>`.
pub(crate) fn job_env(job: &BuildJob) -> HashMap<String, String> {
    let mut envs = HashMap::new();
    for (axis, value) in &job.variables {
        envs.insert(format!("SHIPWAY_{}", env_key(axis)), value.clone());
    }
    for (key, value) in &job.metadata {
        envs.insert(format!("SHIPWAY_META_{}", env_key(key)), value.clone());
    }
    envs
}

fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Packaging adapter that shells out to a configured build command.
///
/// Contract: the command builds exactly one distribution for the
/// variant described by its environment and prints the produced file's
/// path as its last stdout line.
pub struct CommandBuilder {
    command: String,
    workdir: Option<PathBuf>,
}

impl CommandBuilder {
    pub fn new(command: impl Into<String>, workdir: Option<PathBuf>) -> Self {
        Self {
            command: command.into(),
            workdir,
        }
    }
}

#[async_trait]
impl PackageBuilder for CommandBuilder {
    async fn build(&self, job: &BuildJob) -> Result<Artifact> {
        let envs = job_env(job);
        let output = run_shell(&self.command, self.workdir.as_deref(), &envs).await?;

        if !output.success() {
            return Err(Error::Internal(format!(
                "packaging command exited with status {}: {}",
                output.exit_code,
                output.stderr_tail()
            )));
        }

        let path = output
            .stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .next_back()
            .map(|l| PathBuf::from(l.trim()))
            .ok_or_else(|| {
                Error::Internal("packaging command printed no artifact path".to_string())
            })?;
        // The command prints paths relative to its own working directory.
        let path = match (&self.workdir, path.is_relative()) {
            (Some(dir), true) => dir.join(path),
            _ => path,
        };

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::Internal(format!("cannot read artifact {}: {}", path.display(), e)))?;
        let digest = format!("{:x}", Sha256::digest(&bytes));

        info!(job = %job.display_name, path = %path.display(), "Artifact produced");

        Ok(Artifact {
            id: ArtifactId::new(),
            job: job.display_name.clone(),
            path,
            digest,
            produced_at: chrono::Utc::now(),
        })
    }
}
