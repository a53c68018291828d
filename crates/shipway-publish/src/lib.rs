//! Registry publishing and docs deployment for Shipway.

pub mod docs;
pub mod registry;

pub use docs::{DeployState, DocsDeployer};
pub use registry::RegistryPublisher;
