//! Bearer token lifecycle
//!
//! The token is an owned, versioned value. Callers take a [`SessionToken`]
//! snapshot per operation and never share a mutable cell, so a refresh in
//! the middle of a batch cannot tear a read.
//!
//! Expiry is discovered reactively: a data call comes back 401/403, the
//! caller hands its stale snapshot to [`TokenManager::refresh_from`], and at
//! most one re-login runs. Concurrent callers holding the same stale version
//! wait on the gate and then pick up the token the first caller obtained.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use ravenfleet_domain::{impl_state_conversions, Credentials, FleetError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::ports::AuthGateway;

/// Token lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Refreshing,
    Invalid,
}

impl_state_conversions!(TokenState {
    Unauthenticated => "unauthenticated",
    Authenticating => "authenticating",
    Authenticated => "authenticated",
    Refreshing => "refreshing",
    Invalid => "invalid",
});

/// Immutable view of the token at one point in time.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    api_url: Arc<str>,
    token: Arc<str>,
    version: u64,
}

impl SessionToken {
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Increases every time a new token is issued.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("api_url", &self.api_url)
            .field("token", &ravenfleet_domain::constants::REDACTED)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Debug)]
struct TokenInner {
    state: TokenState,
    credentials: Option<Credentials>,
    current: Option<SessionToken>,
    version: u64,
}

impl TokenInner {
    fn clear(&mut self, state: TokenState) {
        self.state = state;
        self.credentials = None;
        self.current = None;
        self.version += 1;
    }
}

/// Owns the current bearer token and serialises its renewal.
pub struct TokenManager {
    gateway: Arc<dyn AuthGateway>,
    inner: RwLock<TokenInner>,
    refresh_gate: Mutex<()>,
}

impl TokenManager {
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        Self {
            gateway,
            inner: RwLock::new(TokenInner {
                state: TokenState::Unauthenticated,
                credentials: None,
                current: None,
                version: 0,
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn state(&self) -> TokenState {
        self.inner.read().state
    }

    /// Current token, if one has been issued and not invalidated.
    pub fn snapshot(&self) -> Option<SessionToken> {
        self.inner.read().current.clone()
    }

    /// Log in with `credentials`.
    ///
    /// # Errors
    /// - `FleetError::InvalidState` unless the manager is unauthenticated or
    ///   invalid
    /// - the gateway's error when login fails; the manager is then `Invalid`
    ///   and holds no token or credentials
    #[instrument(skip_all, fields(api_url = %credentials.api_url()))]
    pub async fn acquire(&self, credentials: Credentials) -> Result<SessionToken> {
        {
            let mut inner = self.inner.write();
            if !matches!(inner.state, TokenState::Unauthenticated | TokenState::Invalid) {
                return Err(FleetError::invalid_state(format!(
                    "cannot acquire a token while {}",
                    inner.state
                )));
            }
            inner.state = TokenState::Authenticating;
            inner.credentials = Some(credentials.clone());
        }

        debug!("logging in");
        let outcome = self.gateway.login(&credentials).await;

        let mut inner = self.inner.write();
        if inner.state != TokenState::Authenticating {
            return Err(FleetError::session_expired("session was reset during login"));
        }
        match outcome {
            Ok(token) => {
                let session = Self::install(&mut inner, credentials.api_url(), token);
                info!(version = session.version, "token acquired");
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                inner.clear(TokenState::Invalid);
                Err(err)
            }
        }
    }

    /// Re-login with the last-known credentials and return the new token.
    ///
    /// # Errors
    /// Same as [`TokenManager::refresh_from`]; `FleetError::InvalidState`
    /// when there is no token to refresh.
    pub async fn refresh(&self) -> Result<SessionToken> {
        let stale = self
            .snapshot()
            .ok_or_else(|| FleetError::invalid_state(format!("cannot refresh while {}", self.state())))?;
        self.refresh_from(&stale).await
    }

    /// Renew the token that `stale` was taken from.
    ///
    /// If another caller already replaced that token, the newer one is
    /// returned without a second login.
    ///
    /// # Errors
    /// - `FleetError::SessionExpired` when the re-login fails or an earlier
    ///   refresh already invalidated the session; token and credentials are
    ///   cleared
    /// - `FleetError::InvalidState` when the manager was never authenticated
    #[instrument(skip_all, fields(stale_version = stale.version))]
    pub async fn refresh_from(&self, stale: &SessionToken) -> Result<SessionToken> {
        let _gate = self.refresh_gate.lock().await;

        let credentials = {
            let mut inner = self.inner.write();
            match inner.state {
                TokenState::Authenticated => {}
                TokenState::Invalid => {
                    return Err(FleetError::session_expired("session is no longer valid"));
                }
                state => {
                    return Err(FleetError::invalid_state(format!("cannot refresh while {state}")));
                }
            }
            if let Some(current) = &inner.current {
                if current.version != stale.version {
                    debug!(current_version = current.version, "token already refreshed");
                    return Ok(current.clone());
                }
            }
            let Some(credentials) = inner.credentials.clone() else {
                inner.clear(TokenState::Invalid);
                return Err(FleetError::session_expired("no credentials to refresh with"));
            };
            inner.state = TokenState::Refreshing;
            credentials
        };

        info!("refreshing token");
        let outcome = self.gateway.login(&credentials).await;

        let mut inner = self.inner.write();
        if inner.state != TokenState::Refreshing {
            return Err(FleetError::session_expired("session was reset during refresh"));
        }
        match outcome {
            Ok(token) => {
                let session = Self::install(&mut inner, credentials.api_url(), token);
                info!(version = session.version, "token refreshed");
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed; session invalidated");
                inner.clear(TokenState::Invalid);
                Err(FleetError::session_expired(format!("token refresh failed: {err}")))
            }
        }
    }

    /// Drop token and credentials and mark the session dead.
    pub fn invalidate(&self) {
        self.inner.write().clear(TokenState::Invalid);
    }

    /// Drop token and credentials and return to the initial state.
    pub fn reset(&self) {
        self.inner.write().clear(TokenState::Unauthenticated);
    }

    fn install(inner: &mut TokenInner, api_url: &str, token: String) -> SessionToken {
        inner.version += 1;
        let session = SessionToken {
            api_url: Arc::from(api_url),
            token: Arc::from(token),
            version: inner.version,
        };
        inner.current = Some(session.clone());
        inner.state = TokenState::Authenticated;
        session
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager").field("state", &self.state()).finish_non_exhaustive()
    }
}
