//! Least-privilege credential scoping.

use crate::providers::SecretStore;
use shipway_core::credential::{Credential, PublishTarget};
use shipway_core::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Hands each publish path only the credential bound to its target.
///
/// There is no bulk accessor: registry code paths can never observe the
/// docs credential and vice versa. A missing key is a configuration
/// error, fatal only to the path that asked for it.
pub struct CredentialScope {
    store: Arc<dyn SecretStore>,
    registry_key: String,
    docs_key: String,
}

impl CredentialScope {
    pub fn new(
        store: Arc<dyn SecretStore>,
        registry_key: impl Into<String>,
        docs_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            registry_key: registry_key.into(),
            docs_key: docs_key.into(),
        }
    }

    pub async fn credential(&self, target: PublishTarget) -> Result<Credential> {
        let key = match target {
            PublishTarget::Registry => &self.registry_key,
            PublishTarget::Docs => &self.docs_key,
        };

        let value = self.store.get(key).await.map_err(|_| {
            Error::Configuration(format!("missing credential for {}: {}", target, key))
        })?;

        debug!(%target, key = %key, store = %self.store.name(), "Credential resolved");
        Ok(Credential::new(target, key.clone(), value.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryStore;
    use std::collections::HashMap;

    fn scope() -> CredentialScope {
        let mut secrets = HashMap::new();
        secrets.insert("REGISTRY_TOKEN".to_string(), "registry-secret".to_string());
        secrets.insert("DOCS_TOKEN".to_string(), "docs-secret".to_string());
        CredentialScope::new(
            Arc::new(MemoryStore::from_map(secrets)),
            "REGISTRY_TOKEN",
            "DOCS_TOKEN",
        )
    }

    #[tokio::test]
    async fn test_each_target_gets_its_own_credential() {
        let scope = scope();

        let registry = scope.credential(PublishTarget::Registry).await.unwrap();
        assert_eq!(registry.target, PublishTarget::Registry);
        assert_eq!(registry.expose(), "registry-secret");

        let docs = scope.credential(PublishTarget::Docs).await.unwrap();
        assert_eq!(docs.target, PublishTarget::Docs);
        assert_eq!(docs.expose(), "docs-secret");

        // Neither credential carries the other target's material.
        assert_ne!(registry.expose(), docs.expose());
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let scope = CredentialScope::new(
            Arc::new(MemoryStore::new()),
            "REGISTRY_TOKEN",
            "DOCS_TOKEN",
        );

        let err = scope.credential(PublishTarget::Docs).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
