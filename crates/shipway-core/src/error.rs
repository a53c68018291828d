//! Error types for Shipway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors (malformed variant spec, missing credential)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // Packaging errors, isolated to one build job
    #[error("Build failed for {job}: {cause}")]
    Build { job: String, cause: String },

    // Registry errors, isolated to one build job
    #[error("Publish failed for {job}: {cause}")]
    Publish { job: String, cause: String },

    // Docs path errors
    #[error("Docs deploy failed: {0}")]
    Deploy(String),

    // Secret errors
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
