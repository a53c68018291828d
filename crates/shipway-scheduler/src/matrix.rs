//! Matrix expansion for parallel job generation.

use shipway_core::ids::JobId;
use shipway_core::variant::{BuildJob, VariantSpec};
use shipway_core::Result;
use std::collections::BTreeMap;
use tracing::debug;

/// Expander for variant specifications.
///
/// Expansion is deterministic: axes are walked in declaration order,
/// the first axis varying slowest, so a fixed spec always yields the
/// same job sequence.
pub struct MatrixExpander;

impl MatrixExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expand a variant spec into the full cross-product of its axes,
    /// with excluded combinations removed and augmentation metadata
    /// merged onto surviving cells.
    pub fn expand(&self, spec: &VariantSpec) -> Result<Vec<BuildJob>> {
        spec.validate()?;

        let mut combinations = self.generate_combinations(spec);

        // Apply excludes
        combinations.retain(|combo| {
            !spec
                .exclude
                .iter()
                .any(|exclude| Self::matches_exclude(combo, exclude))
        });

        let jobs: Vec<BuildJob> = combinations
            .into_iter()
            .enumerate()
            .map(|(idx, variables)| {
                let metadata = self.augmentations_for(spec, &variables);
                let display_name = Self::format_display_name(spec, &variables);
                BuildJob {
                    id: JobId::default(),
                    index: idx,
                    variables,
                    metadata,
                    display_name,
                }
            })
            .collect();

        debug!(jobs = jobs.len(), "Matrix expanded");
        Ok(jobs)
    }

    fn generate_combinations(&self, spec: &VariantSpec) -> Vec<BTreeMap<String, String>> {
        let mut result = vec![BTreeMap::new()];

        for axis in &spec.axes {
            let mut new_result = Vec::new();

            for combo in result {
                for value in &axis.values {
                    let mut new_combo = combo.clone();
                    new_combo.insert(axis.name.clone(), value.clone());
                    new_result.push(new_combo);
                }
            }

            result = new_result;
        }

        result
    }

    fn matches_exclude(
        combo: &BTreeMap<String, String>,
        exclude: &BTreeMap<String, String>,
    ) -> bool {
        exclude
            .iter()
            .all(|(key, value)| combo.get(key) == Some(value))
    }

    fn augmentations_for(
        &self,
        spec: &VariantSpec,
        combo: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        for augmentation in &spec.augment {
            if combo.get(&augmentation.axis) == Some(&augmentation.value) {
                metadata.extend(augmentation.metadata.clone());
            }
        }
        metadata
    }

    fn format_display_name(spec: &VariantSpec, combo: &BTreeMap<String, String>) -> String {
        // Axis declaration order, not map order.
        let parts: Vec<String> = spec
            .axes
            .iter()
            .filter_map(|axis| {
                combo
                    .get(&axis.name)
                    .map(|v| format!("{}={}", axis.name, v))
            })
            .collect();
        parts.join(", ")
    }
}

impl Default for MatrixExpander {
    fn default() -> Self {
        Self::new()
    }
}
