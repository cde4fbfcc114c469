//! Process-wide session store
//!
//! Holds the current tokens and identity, writes every change straight
//! through to [`SessionStorage`], and broadcasts lifecycle events so the
//! view controller can react to an irrecoverable auth failure.

use std::sync::Arc;

use dailytrack_domain::constants::{ACCESS_TOKEN_KEY, CURRENT_USER_KEY, REFRESH_TOKEN_KEY};
use dailytrack_domain::{Identity, Result, Session, TrackerError};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::ports::SessionStorage;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Identity),
    TokenRefreshed,
    SignedOut,
    /// Refresh failed or was impossible; storage has already been cleared.
    Invalidated { reason: String },
}

/// Tokens and user returned by a successful login.
#[derive(Clone)]
pub struct LoginGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Identity,
}

impl std::fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGrant")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Shared session state, one per process behind an `Arc`.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<Session>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Create an empty store; call [`SessionStore::restore`] to load
    /// persisted state.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { storage, state: RwLock::new(Session::default()), events }
    }

    /// Load persisted tokens and identity.
    ///
    /// Never fails: a key that cannot be read, or a user that does not
    /// parse, is simply left empty.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Session {
        let access_token = self.read_key(ACCESS_TOKEN_KEY).await;
        let refresh_token = self.read_key(REFRESH_TOKEN_KEY).await;
        let user = match self.read_key(CURRENT_USER_KEY).await {
            Some(raw) => match serde_json::from_str::<Identity>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Stored user is malformed, ignoring it");
                    None
                }
            },
            None => None,
        };

        let session = Session { access_token, refresh_token, user };
        info!(
            authenticated = session.is_authenticated(),
            has_access_token = session.access_token.is_some(),
            "Session restored"
        );
        *self.state.write() = session.clone();
        session
    }

    /// Replace (or clear with `None`) the access token.
    ///
    /// Memory only changes once storage has accepted the write.
    pub async fn set_token(&self, token: Option<String>) -> Result<()> {
        self.write_key(ACCESS_TOKEN_KEY, token.as_deref()).await?;
        self.state.write().access_token = token;
        Ok(())
    }

    /// Replace (or clear with `None`) the refresh token.
    pub async fn set_refresh_token(&self, token: Option<String>) -> Result<()> {
        self.write_key(REFRESH_TOKEN_KEY, token.as_deref()).await?;
        self.state.write().refresh_token = token;
        Ok(())
    }

    /// Persist the identity. `None` is ignored; use [`SessionStore::clear`]
    /// to forget the user.
    pub async fn set_user(&self, user: Option<Identity>) -> Result<()> {
        let Some(user) = user else {
            debug!("set_user(None) leaves the stored user in place");
            return Ok(());
        };
        let encoded = encode_user(&user)?;
        self.write_key(CURRENT_USER_KEY, Some(&encoded)).await?;
        self.state.write().user = Some(user);
        Ok(())
    }

    /// Begin a session from a login response.
    #[instrument(skip(self, grant), fields(email = %grant.user.email, role = %grant.user.role))]
    pub async fn start(&self, grant: LoginGrant) -> Result<()> {
        let LoginGrant { access_token, refresh_token, user } = grant;
        let encoded = encode_user(&user)?;

        let persisted = async {
            self.write_key(ACCESS_TOKEN_KEY, Some(&access_token)).await?;
            self.write_key(REFRESH_TOKEN_KEY, refresh_token.as_deref()).await?;
            self.write_key(CURRENT_USER_KEY, Some(&encoded)).await
        }
        .await;
        if let Err(e) = persisted {
            warn!(error = %e, "Could not persist the new session, discarding it");
            self.clear().await;
            return Err(e);
        }

        *self.state.write() = Session {
            access_token: Some(access_token),
            refresh_token,
            user: Some(user.clone()),
        };
        info!("Session started");
        self.publish(SessionEvent::SignedIn(user));
        Ok(())
    }

    /// Store a freshly refreshed access token and announce it.
    pub async fn apply_refresh(&self, token: String) -> Result<()> {
        self.set_token(Some(token)).await?;
        debug!("Access token refreshed");
        self.publish(SessionEvent::TokenRefreshed);
        Ok(())
    }

    /// Forget tokens and user, in memory and in storage.
    ///
    /// Every key is attempted even if an earlier removal fails.
    pub async fn clear(&self) {
        *self.state.write() = Session::default();
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, CURRENT_USER_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                warn!(key, error = %e, "Failed to remove session key");
            }
        }
    }

    /// User-initiated logout.
    pub async fn sign_out(&self) {
        self.clear().await;
        info!("Signed out");
        self.publish(SessionEvent::SignedOut);
    }

    /// Irrecoverable auth failure: clear everything and notify listeners.
    pub async fn invalidate(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.clear().await;
        warn!(reason = %reason, "Session invalidated");
        self.publish(SessionEvent::Invalidated { reason });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    fn publish(&self, event: SessionEvent) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(event);
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session key");
                None
            }
        }
    }

    async fn write_key(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.storage.set(key, value).await,
            None => self.storage.remove(key).await,
        }
    }
}

fn encode_user(user: &Identity) -> Result<String> {
    serde_json::to_string(user).map_err(|e| TrackerError::Internal(format!("encode user: {e}")))
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("state", &*self.state.read()).finish_non_exhaustive()
    }
}
