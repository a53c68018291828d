//! Secret storage and credential scoping for Shipway.

pub mod providers;
pub mod scope;

pub use providers::{EnvStore, MemoryStore, SecretStore, SecretValue};
pub use scope::CredentialScope;
