pub mod keychain;
pub mod store;
pub mod types;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{ApiError, SessionError};

pub use self::keychain::{KeyringSessionStore, KeyringVault, TokenVault};
pub use self::store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use self::types::{AuthResponse, LoginRequest, RegisterRequest, Session, User};

/// Sole owner of the authentication token and user profile.
///
/// Every mutation replaces the whole `Session` under the write lock and is
/// persisted to the backing store. Concurrent logins are last-write-wins.
pub struct SessionManager {
    state: RwLock<Session>,
    store: Box<dyn SessionStore>,
}

impl SessionManager {
    /// Load whatever was persisted last time. The token is trusted as-is;
    /// an expired token is only discovered by the first rejected request.
    pub fn restore<S: SessionStore + 'static>(store: S) -> Self {
        let session = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("Ignoring unreadable persisted session: {}", e);
                Session::default()
            }
        };
        info!(
            "Restored session (authenticated: {})",
            session.is_authenticated()
        );
        Self {
            state: RwLock::new(session),
            store: Box::new(store),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Headers for an outgoing request. Without a token the map has no
    /// `Authorization` entry at all, so login/register share the same path.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.read().token.as_deref() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending request without it"),
            }
        }
        headers
    }

    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let response = api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.establish(response)
    }

    pub async fn register(
        &self,
        api: &ApiClient,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let response = api
            .register(&RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.establish(response)
    }

    /// Persist first so a storage failure leaves the old session in place.
    fn establish(&self, response: AuthResponse) -> Result<Session, SessionError> {
        let session = Session::authenticated(response.access_token, response.user);
        let mut state = self.write();
        self.store.save(&session)?;
        *state = session.clone();
        drop(state);
        info!(
            "Signed in as {}",
            session.user.as_ref().map(|u| u.email.as_str()).unwrap_or("")
        );
        Ok(session)
    }

    /// Drop token and user from memory and storage. Never fails; a storage
    /// error is logged and the in-memory session is cleared regardless.
    pub fn logout(&self) {
        self.sign_out(&mut self.write());
    }

    /// Store and memory change under the same guard so a concurrent refresh
    /// never sees one without the other.
    fn sign_out(&self, state: &mut Session) {
        *state = Session::default();
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
        info!("Signed out");
    }

    /// Re-fetch the profile with the current token. Any server rejection
    /// means the token is no longer good, so the session is torn down.
    /// Transport failures leave it alone.
    ///
    /// The outcome is applied only if the session still holds the token the
    /// request was sent with. A logout or a new sign-in during the request
    /// wins, and the call fails with `SessionError::Superseded`.
    pub async fn refresh_profile(&self, api: &ApiClient) -> Result<User, SessionError> {
        let sent_with = self.token();
        let result = api.get_profile().await;

        let mut state = self.write();
        if state.token != sent_with {
            info!("Session changed during profile refresh, dropping result");
            return Err(SessionError::Superseded {
                operation: "refresh_profile",
            });
        }

        match result {
            Ok(user) => {
                let session = Session {
                    token: sent_with,
                    user: Some(user.clone()),
                };
                self.store.save(&session)?;
                *state = session;
                info!("Refreshed profile for {}", user.email);
                Ok(user)
            }
            Err(e @ (ApiError::Rejected { .. } | ApiError::Unauthenticated { .. })) => {
                warn!("Profile refresh rejected, clearing session: {}", e);
                self.sign_out(&mut state);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Local-only edit of the display name; the server has no endpoint for it.
    pub fn update_display_name(&self, name: &str) -> Result<User, SessionError> {
        let mut state = self.write();
        let user = match (&state.token, &state.user) {
            (Some(_), Some(user)) => User {
                name: name.trim().to_string(),
                ..user.clone()
            },
            _ => {
                return Err(ApiError::Unauthenticated {
                    operation: "update_display_name",
                }
                .into())
            }
        };
        let session = Session {
            token: state.token.clone(),
            user: Some(user.clone()),
        };
        self.store.save(&session)?;
        *state = session;
        Ok(user)
    }
}
