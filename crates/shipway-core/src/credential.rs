//! Publish credentials, scoped to a single target.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The publish target a credential is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PublishTarget {
    Docs,
    Registry,
}

impl fmt::Display for PublishTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishTarget::Docs => write!(f, "docs"),
            PublishTarget::Registry => write!(f, "registry"),
        }
    }
}

/// A named secret bound to exactly one publish target.
///
/// Never serialized; `Debug` redacts the value so it cannot leak into
/// logs or error messages.
#[derive(Clone)]
pub struct Credential {
    pub target: PublishTarget,
    pub name: String,
    value: String,
}

impl Credential {
    pub fn new(target: PublishTarget, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("target", &self.target)
            .field("name", &self.name)
            .field("value", &"***")
            .finish()
    }
}
