use std::sync::Arc;

use tokio::sync::watch;

use crate::api::UserApi;
use crate::config::Credentials;
use crate::models::User;

use super::{decode, require_payload, Observable, StoreError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub user: Option<User>,
}

impl UserState {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Who is logged in. The session itself lives in the transport's cookie
/// jar; this only mirrors the user record.
#[derive(Clone)]
pub struct UserStore {
    api: UserApi,
    state: Arc<Observable<UserState>>,
}

impl UserStore {
    pub fn new(api: UserApi) -> Self {
        Self {
            api,
            state: Arc::new(Observable::new(UserState::default())),
        }
    }

    pub fn state(&self) -> UserState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.read(|s| s.user.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read(UserState::is_logged_in)
    }

    pub async fn login(&self, mobile: &str, password: &str) -> Result<User, StoreError> {
        self.login_with(&Credentials::new(mobile, password)).await
    }

    /// On failure the previous state is left as it was.
    pub async fn login_with(&self, credentials: &Credentials) -> Result<User, StoreError> {
        let reply = self.api.login(credentials).await.inspect_err(|e| {
            tracing::error!(mobile = %credentials.mobile, error = %e, "Login failed")
        })?;
        require_payload(&reply, "login")?;
        let user: User = decode(&reply, "user")?;

        tracing::info!(user_id = %user.id, "Logged in");
        let logged_in = user.clone();
        self.state.update(|s| s.user = Some(logged_in));
        Ok(user)
    }

    /// Always ends logged out locally, even if the backend call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Logout request failed, clearing session anyway");
        }
        self.state.update(|s| s.user = None);
        tracing::info!("Logged out");
    }

    /// Restore the user from an existing session.
    pub async fn init_user(&self) -> Result<User, StoreError> {
        match self.fetch_current().await {
            Ok(user) => {
                let current = user.clone();
                self.state.update(|s| s.user = Some(current));
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(error = %err, "No active session");
                self.state.update(|s| s.user = None);
                Err(err)
            }
        }
    }

    async fn fetch_current(&self) -> Result<User, StoreError> {
        let reply = self.api.current().await?;
        decode(&reply, "user")
    }
}
