//! Variant job execution and process-backed collaborators for Shipway.

pub mod collaborators;
pub mod command;
pub mod runner;

pub use collaborators::{CommandDocsBuilder, CommandDocsHost, CommandUploader};
pub use command::CommandBuilder;
pub use runner::VariantRunner;
