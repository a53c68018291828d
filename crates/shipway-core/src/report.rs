//! Pipeline run results.

use crate::ids::RunId;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Terminal status of one concurrent unit (a build job or the docs path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Success,
    Failure,
    Skipped,
}

impl UnitStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitStatus::Success | UnitStatus::Skipped)
    }
}

/// Outcome of one concurrent unit, kept per-unit so operators can see
/// exactly which variants need a re-run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnitOutcome {
    pub unit: String,
    pub status: UnitStatus,
    pub error: Option<String>,
    pub artifact_digest: Option<String>,
}

impl UnitOutcome {
    pub fn success(unit: impl Into<String>, artifact_digest: Option<String>) -> Self {
        Self {
            unit: unit.into(),
            status: UnitStatus::Success,
            error: None,
            artifact_digest,
        }
    }

    pub fn failure(unit: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            status: UnitStatus::Failure,
            error: Some(error.into()),
            artifact_digest: None,
        }
    }

    pub fn skipped(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            status: UnitStatus::Skipped,
            error: None,
            artifact_digest: None,
        }
    }
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineResult {
    pub run_id: RunId,
    pub trigger_ref: String,
    /// True when the trigger filter declined the event; no units ran.
    pub skipped: bool,
    pub jobs: Vec<UnitOutcome>,
    pub docs: UnitOutcome,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn skipped_run(run_id: RunId, trigger_ref: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            trigger_ref: trigger_ref.into(),
            skipped: true,
            jobs: vec![],
            docs: UnitOutcome::skipped("docs"),
            started_at: now,
            completed_at: now,
        }
    }

    /// Overall status: failed if any job's publish failed or the docs
    /// deploy failed.
    pub fn is_success(&self) -> bool {
        self.docs.status.is_success() && self.jobs.iter().all(|j| j.status.is_success())
    }

    pub fn failed_units(&self) -> Vec<&UnitOutcome> {
        self.jobs
            .iter()
            .chain(std::iter::once(&self.docs))
            .filter(|u| u.status == UnitStatus::Failure)
            .collect()
    }
}
