//! Docs deployment.

use shipway_core::credential::{Credential, PublishTarget};
use shipway_core::ports::{DocsBuilder, DocsHost};
use shipway_core::{Error, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Observable deployment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Idle,
    Building,
    Pushing,
    Done,
    Failed,
}

/// Builds the documentation output tree and synchronizes it onto the
/// deployment branch.
///
/// The push is content-replacing: the branch is a rolling log of
/// deployments, not a fine-grained history of the source. Failure at
/// either stage is fatal to the docs path only.
pub struct DocsDeployer {
    builder: Arc<dyn DocsBuilder>,
    host: Arc<dyn DocsHost>,
    target_branch: String,
    state: RwLock<DeployState>,
}

impl DocsDeployer {
    pub fn new(
        builder: Arc<dyn DocsBuilder>,
        host: Arc<dyn DocsHost>,
        target_branch: impl Into<String>,
    ) -> Self {
        Self {
            builder,
            host,
            target_branch: target_branch.into(),
            state: RwLock::new(DeployState::Idle),
        }
    }

    pub async fn state(&self) -> DeployState {
        *self.state.read().await
    }

    async fn set_state(&self, state: DeployState) {
        *self.state.write().await = state;
    }

    pub async fn deploy(&self, credential: &Credential) -> Result<()> {
        if credential.target != PublishTarget::Docs {
            self.set_state(DeployState::Failed).await;
            return Err(Error::Configuration(format!(
                "docs deploy given a {} credential",
                credential.target
            )));
        }

        self.set_state(DeployState::Building).await;
        info!("Building docs");

        let tree = match self.builder.build_docs().await {
            Ok(tree) => tree,
            Err(e) => {
                error!(error = %e, "Docs build failed");
                self.set_state(DeployState::Failed).await;
                return Err(Error::Deploy(format!("build: {}", e)));
            }
        };

        self.set_state(DeployState::Pushing).await;
        info!(branch = %self.target_branch, tree = %tree.root.display(), "Pushing docs");

        if let Err(e) = self.host.push(&tree, credential, &self.target_branch).await {
            error!(error = %e, "Docs push failed");
            self.set_state(DeployState::Failed).await;
            return Err(Error::Deploy(format!("push: {}", e)));
        }

        self.set_state(DeployState::Done).await;
        info!(branch = %self.target_branch, "Docs deployed");
        Ok(())
    }
}
