//! Explicit session context
//!
//! Holds the bearer token and the cached identity. `login` populates it,
//! `logout` tears it down; both write through to the credential store. The
//! client, the flow and the telemetry worker share one context.

use crate::credentials::{CredentialStore, StoredCredentials};
use crate::error::{SdkError, SdkResult};
use mindarena_types::{AuthUser, UserId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    current: Arc<RwLock<Option<StoredCredentials>>>,
}

impl SessionContext {
    /// Empty context backed by `store`; nothing is read from it
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Context initialized from whatever `store` already holds
    pub fn restore(store: Arc<dyn CredentialStore>) -> SdkResult<Self> {
        let persisted = store.load()?;
        Ok(Self {
            store,
            current: Arc::new(RwLock::new(persisted)),
        })
    }

    /// Persist and activate credentials
    pub fn login(&self, token: impl Into<String>, user: AuthUser) -> SdkResult<()> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SdkError::Credentials("token must not be empty".to_string()));
        }

        let credentials = StoredCredentials { token, user };
        self.store.save(&credentials)?;
        info!(user = %credentials.user.email, "logged in");
        *self.current.write() = Some(credentials);
        Ok(())
    }

    /// Drop credentials from memory and from the store
    pub fn logout(&self) -> SdkResult<()> {
        let previous = self.current.write().take();
        if let Some(previous) = previous {
            info!(user = %previous.user.email, "logged out");
        }
        self.store.clear()
    }

    /// The cached identity; never touches the network
    pub fn current_user(&self) -> SdkResult<AuthUser> {
        self.current
            .read()
            .as_ref()
            .map(|c| c.user.clone())
            .ok_or(SdkError::NotAuthenticated)
    }

    /// Profile key of the cached identity
    pub fn user_id(&self) -> SdkResult<UserId> {
        self.current_user().map(|u| u.user_id())
    }

    /// Bearer token to attach, if logged in
    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|c| c.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }
}
