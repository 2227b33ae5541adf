use std::sync::{Arc, RwLock};
use trackflix_sources::{AccountService, LoginOutcome, SourceError};
use tracing::{info, warn};

/// Process-wide record of who is logged in.
///
/// Set on login, read by every watchlist call, cleared on logout. This is a
/// cache of the identity, not a credential: the server-side session decides
/// whether a mutation is allowed.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    email: Arc<RwLock<Option<String>>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with an email restored from the on-disk cache
    pub fn restored(email: Option<String>) -> Self {
        let state = Self::new();
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            state.set_email(email);
        }
        state
    }

    pub fn email(&self) -> Option<String> {
        self.email
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.email().is_some()
    }

    pub fn set_email(&self, email: String) {
        *self.email.write().unwrap_or_else(|e| e.into_inner()) = Some(email);
    }

    pub fn clear(&self) {
        *self.email.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Log in against the session guard. Only a successful login changes state.
    pub async fn login(
        &self,
        accounts: &dyn AccountService,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, SourceError> {
        let outcome = accounts.login(email, password).await?;
        match &outcome {
            LoginOutcome::Success => {
                self.set_email(email.to_string());
                info!("Session started for {}", email);
            }
            LoginOutcome::Rejected(reason) => {
                warn!("Login rejected for {}: {}", email, reason);
            }
        }
        Ok(outcome)
    }

    /// End the session. The local identity is dropped even if the server call fails.
    pub async fn logout(&self, accounts: &dyn AccountService) -> Result<(), SourceError> {
        let result = accounts.logout().await;
        self.clear();
        if let Err(e) = &result {
            warn!("Logout request failed, local session cleared anyway: {}", e);
        }
        result
    }
}
