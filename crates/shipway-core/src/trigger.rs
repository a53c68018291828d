//! Trigger events delivered by the external event source.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of git ref an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Branch,
    Tag,
}

/// An event from the repository host that may start a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TriggerEvent {
    pub ref_kind: RefKind,
    pub ref_name: String,
}

impl TriggerEvent {
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            ref_kind: RefKind::Tag,
            ref_name: name.into(),
        }
    }

    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            ref_kind: RefKind::Branch,
            ref_name: name.into(),
        }
    }

    /// Version string for a tag event, with a leading `v` stripped.
    /// Branch events carry no version.
    pub fn version(&self) -> Option<&str> {
        match self.ref_kind {
            RefKind::Tag => Some(
                self.ref_name
                    .strip_prefix('v')
                    .unwrap_or(&self.ref_name),
            ),
            RefKind::Branch => None,
        }
    }
}
