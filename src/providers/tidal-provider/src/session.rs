//! Session lifecycle: keeps one authenticated SDK session alive and persists
//! rotated tokens to the host configuration store.

use crate::sdk::{SessionFactory, SessionHandle};
use chorus_core::host::{provider_value_key, ConfigStore};
use chorus_core::provider::{ProviderError, ProviderResult};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TOKEN_TYPE: &str = "Bearer";

pub const USER_ID_KEY: &str = "username";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const EXPIRY_TIME_KEY: &str = "expiry_time";

/// Token set used to establish a session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub token_type: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expiry_time: Option<DateTime<Utc>>,
}

impl Default for SessionCredentials {
    fn default() -> Self {
        Self {
            token_type: TOKEN_TYPE.to_string(),
            access_token: None,
            refresh_token: None,
            expiry_time: None,
        }
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redacted(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "[REDACTED]"
            } else {
                "None"
            }
        }
        f.debug_struct("SessionCredentials")
            .field("token_type", &self.token_type)
            .field("access_token", &redacted(&self.access_token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .field("expiry_time", &self.expiry_time)
            .finish()
    }
}

impl SessionCredentials {
    /// Reads previously persisted credentials. Missing or empty values are
    /// left unset.
    pub fn load(store: &dyn ConfigStore, instance_id: &str) -> ProviderResult<Self> {
        let read = |field: &str| {
            store
                .get(&provider_value_key(instance_id, field))
                .filter(|value| !value.is_empty())
        };
        let expiry_time = read(EXPIRY_TIME_KEY)
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(|e| ProviderError::Other {
                        message: format!("invalid stored {EXPIRY_TIME_KEY} {raw:?}: {e}"),
                    })
            })
            .transpose()?;
        Ok(Self {
            token_type: TOKEN_TYPE.to_string(),
            access_token: read(ACCESS_TOKEN_KEY),
            refresh_token: read(REFRESH_TOKEN_KEY),
            expiry_time,
        })
    }

    pub fn from_session<S: SessionHandle>(session: &S) -> Self {
        Self {
            token_type: TOKEN_TYPE.to_string(),
            access_token: Some(session.access_token().to_string()),
            refresh_token: Some(session.refresh_token().to_string()),
            expiry_time: Some(session.expiry_time()),
        }
    }

    fn valid_beyond(&self, deadline: DateTime<Utc>) -> bool {
        self.expiry_time.is_some_and(|expiry| expiry > deadline)
    }
}

/// Session handle plus the user it belongs to.
pub struct CurrentSession<S> {
    pub handle: Arc<S>,
    pub user_id: String,
}

impl<S> Clone for CurrentSession<S> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            user_id: self.user_id.clone(),
        }
    }
}

/// Cached credentials and, once logged in, the session established from them.
/// Always replaced as a whole.
struct SessionState<S> {
    credentials: SessionCredentials,
    active: Option<CurrentSession<S>>,
}

impl<S: SessionHandle> SessionState<S> {
    fn established(handle: Arc<S>) -> Self {
        Self {
            credentials: SessionCredentials::from_session(handle.as_ref()),
            active: Some(CurrentSession {
                user_id: handle.user_id().to_string(),
                handle,
            }),
        }
    }

    /// The active session, if its token is the cached one and it outlives
    /// `deadline`.
    fn reusable(&self, deadline: DateTime<Utc>) -> Option<Arc<S>> {
        let active = self.active.as_ref()?;
        let token_matches =
            self.credentials.access_token.as_deref() == Some(active.handle.access_token());
        (token_matches && self.credentials.valid_beyond(deadline))
            .then(|| Arc::clone(&active.handle))
    }
}

pub struct SessionManager<F: SessionFactory> {
    instance_id: String,
    factory: F,
    config: Arc<dyn ConfigStore>,
    /// Sessions expiring within this window are refreshed before reuse.
    refresh_margin: Duration,
    state: Mutex<SessionState<F::Session>>,
}

impl<F: SessionFactory> SessionManager<F> {
    pub fn new(
        instance_id: impl Into<String>,
        factory: F,
        config: Arc<dyn ConfigStore>,
        credentials: SessionCredentials,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            factory,
            config,
            refresh_margin,
            state: Mutex::new(SessionState {
                credentials,
                active: None,
            }),
        }
    }

    /// Returns a session that stays valid for at least the refresh margin,
    /// establishing a new one when the cached session is missing, stale, or
    /// about to expire.
    ///
    /// The state lock is held while refreshing, so concurrent callers wait for
    /// a single refresh instead of racing their own.
    pub async fn ensure_session(&self) -> ProviderResult<Arc<F::Session>> {
        let mut state = self.state.lock().await;
        if let Some(handle) = state.reusable(Utc::now() + self.refresh_margin) {
            return Ok(handle);
        }

        tracing::debug!(provider = %self.instance_id, "establishing tidal session");
        let session = self
            .factory
            .open_session(&state.credentials)
            .await
            .map_err(|err| {
                tracing::warn!(provider = %self.instance_id, error = %err, "tidal login failed");
                ProviderError::from(err)
            })?;

        self.persist(&session)?;
        let handle = Arc::new(session);
        *state = SessionState::established(Arc::clone(&handle));
        tracing::info!(
            provider = %self.instance_id,
            user_id = %handle.user_id(),
            expires = %handle.expiry_time(),
            "tidal session established"
        );
        Ok(handle)
    }

    /// The session established by the last login, without any freshness check.
    pub async fn current(&self) -> ProviderResult<CurrentSession<F::Session>> {
        self.state
            .lock()
            .await
            .active
            .clone()
            .ok_or_else(|| ProviderError::AuthenticationError {
                message: format!("provider {} is not logged in", self.instance_id),
            })
    }

    pub async fn credentials(&self) -> SessionCredentials {
        self.state.lock().await.credentials.clone()
    }

    pub async fn user_id(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .active
            .as_ref()
            .map(|active| active.user_id.clone())
    }

    fn persist(&self, session: &F::Session) -> ProviderResult<()> {
        let expiry = session.expiry_time().to_rfc3339();
        for (field, value) in [
            (USER_ID_KEY, session.user_id()),
            (ACCESS_TOKEN_KEY, session.access_token()),
            (REFRESH_TOKEN_KEY, session.refresh_token()),
            (EXPIRY_TIME_KEY, expiry.as_str()),
        ] {
            self.config
                .set(&provider_value_key(&self.instance_id, field), value)?;
        }
        Ok(())
    }
}
