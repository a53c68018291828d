//! Trigger gating.

use shipway_core::trigger::{RefKind, TriggerEvent};

/// Decides whether an incoming event starts a pipeline run.
///
/// Pure predicate: a run starts only for tag creation, any tag name.
pub struct TriggerFilter;

impl TriggerFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn should_run(&self, event: &TriggerEvent) -> bool {
        event.ref_kind == RefKind::Tag
    }
}

impl Default for TriggerFilter {
    fn default() -> Self {
        Self::new()
    }
}
