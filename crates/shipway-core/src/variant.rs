//! Variant matrix specification and build jobs.

use crate::ids::JobId;
use crate::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One build-variant axis: a name and its ordered values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Axis {
    pub name: String,
    pub values: Vec<String>,
}

/// Extra metadata attached to every matrix cell carrying a specific
/// axis value (e.g. a wheel tag for one runtime version).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Augmentation {
    pub axis: String,
    pub value: String,
    pub metadata: BTreeMap<String, String>,
}

/// Declarative description of the build matrix.
///
/// Axes are ordered; expansion order follows declaration order, so a
/// fixed spec always expands to the same job sequence. An exclusion is
/// a partial axis-to-value assignment; every cell it is a subset of is
/// dropped. Exclusions and augmentations naming a value absent from
/// their axis match nothing and are no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VariantSpec {
    pub axes: Vec<Axis>,
    #[serde(default)]
    pub exclude: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub augment: Vec<Augmentation>,
}

impl VariantSpec {
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Check structural invariants: unique axis names, and exclusions
    /// and augmentations may only reference declared axes.
    pub fn validate(&self) -> Result<()> {
        for (i, axis) in self.axes.iter().enumerate() {
            if self.axes[..i].iter().any(|a| a.name == axis.name) {
                return Err(Error::Configuration(format!(
                    "duplicate axis: {}",
                    axis.name
                )));
            }
        }

        for exclusion in &self.exclude {
            for name in exclusion.keys() {
                if self.axis(name).is_none() {
                    return Err(Error::Configuration(format!(
                        "exclusion references unknown axis: {}",
                        name
                    )));
                }
            }
        }

        for augmentation in &self.augment {
            if self.axis(&augmentation.axis).is_none() {
                return Err(Error::Configuration(format!(
                    "augmentation references unknown axis: {}",
                    augmentation.axis
                )));
            }
        }

        Ok(())
    }
}

/// One concrete matrix cell, ready to build.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BuildJob {
    pub id: JobId,
    pub index: usize,
    pub variables: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
    pub display_name: String,
}

impl BuildJob {
    pub fn value(&self, axis: &str) -> Option<&str> {
        self.variables.get(axis).map(String::as_str)
    }
}
