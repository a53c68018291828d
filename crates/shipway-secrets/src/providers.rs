//! Secret store trait and implementations.

use async_trait::async_trait;
use shipway_core::Result;
use std::collections::HashMap;

/// A secret value. Holds no metadata beyond the material itself; the
/// store is populated once at pipeline start and read-only after.
#[derive(Clone)]
pub struct SecretValue {
    pub value: String,
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue").field("value", &"***").finish()
    }
}

/// Trait for secret stores.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Get a secret by key.
    async fn get(&self, key: &str) -> Result<SecretValue>;

    /// Check if a secret exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Store name for logging.
    fn name(&self) -> &str;
}

/// Environment-backed secret store: the invoking host injects secrets
/// as environment variables before the run starts.
pub struct EnvStore {
    prefix: Option<String>,
}

impl EnvStore {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    fn resolve_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{}_{}", p, key),
            None => key.to_string(),
        }
    }
}

impl Default for EnvStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SecretStore for EnvStore {
    async fn get(&self, key: &str) -> Result<SecretValue> {
        let env_key = self.resolve_key(key);
        std::env::var(&env_key)
            .map(|value| SecretValue { value })
            .map_err(|_| shipway_core::Error::SecretNotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let env_key = self.resolve_key(key);
        Ok(std::env::var(&env_key).is_ok())
    }

    fn name(&self) -> &str {
        "env"
    }
}

/// In-memory secret store (for tests and dry runs).
pub struct MemoryStore {
    secrets: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            secrets: HashMap::new(),
        }
    }

    pub fn from_map(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<SecretValue> {
        self.secrets
            .get(key)
            .map(|value| SecretValue {
                value: value.clone(),
            })
            .ok_or_else(|| shipway_core::Error::SecretNotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.secrets.contains_key(key))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
