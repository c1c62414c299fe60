use std::sync::Arc;

use anyhow::Context as _;
use ld_portal::{FileSessionStore, PortalConfig, RestPortalClient, SessionContext};
use ld_portal_sdk::{PortalClientV1, PortalError, Role, UserIdentity};

/// Everything a command needs: effective config, session and API client.
pub struct AppContext {
    pub config: PortalConfig,
    pub session: Arc<SessionContext>,
    client: Arc<RestPortalClient>,
}

impl AppContext {
    /// Restore the persisted session and build the REST client.
    pub fn from_config(config: PortalConfig) -> anyhow::Result<Self> {
        let store = FileSessionStore::new(&config.session.state_dir);
        tracing::debug!(path = %store.path().display(), "using session file");
        let session = SessionContext::init(Arc::new(store));
        let client = RestPortalClient::from_config(&config.api, Arc::clone(&session))
            .context("failed to set up the portal client")?;
        Ok(Self::new(config, session, client))
    }

    pub fn new(config: PortalConfig, session: Arc<SessionContext>, client: RestPortalClient) -> Self {
        Self {
            config,
            session,
            client: Arc::new(client),
        }
    }

    pub fn api(&self) -> Arc<dyn PortalClientV1> {
        self.client.clone()
    }

    /// The signed-in user, or an unauthorized error.
    pub fn identity(&self) -> Result<UserIdentity, PortalError> {
        self.session
            .identity()
            .ok_or_else(|| PortalError::unauthorized("not logged in"))
    }

    pub fn require_admin(&self) -> anyhow::Result<UserIdentity> {
        let user = self.identity()?;
        if user.role != Role::Admin {
            anyhow::bail!("this command needs an admin session, signed in as {}", user.role);
        }
        Ok(user)
    }
}
