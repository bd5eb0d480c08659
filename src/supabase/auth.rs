//! Supabase auth (GoTrue) session provider.
//!
//! The provider is the one place the process keeps a session. Tokens live in
//! memory only, wrapped in [`SecretString`]; every change is announced through
//! the [`SessionHub`] so mounted screens stay in step without polling.

use crate::{
    blog::{
        BackendError, Session, SessionEvent, SessionHub, SessionProvider, Subscription,
        session::SessionHandler,
    },
    supabase::api::ApiClient,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

/// Refresh this many seconds before the access token actually expires.
const EXPIRY_MARGIN_SECONDS: i64 = 10;
/// Lifetime assumed when the token response carries none.
const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserRecord,
}

#[derive(Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

struct StoredSession {
    user: Session,
    access_token: SecretString,
    refresh_token: SecretString,
    /// Unix seconds.
    expires_at: i64,
}

impl StoredSession {
    fn from_response(response: TokenResponse) -> Self {
        let now = Utc::now().timestamp();
        let expires_at = response.expires_at.unwrap_or_else(|| {
            now + response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECONDS)
        });

        Self {
            user: Session {
                id: response.user.id,
                email: response.user.email.unwrap_or_default(),
            },
            access_token: SecretString::from(response.access_token),
            refresh_token: SecretString::from(response.refresh_token),
            expires_at,
        }
    }

    fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECONDS <= now
    }
}

pub struct SupabaseAuth {
    api: ApiClient,
    hub: SessionHub,
    session: Mutex<Option<StoredSession>>,
}

impl SupabaseAuth {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            hub: SessionHub::new(),
            session: Mutex::new(None),
        }
    }

    fn session(&self) -> MutexGuard<'_, Option<StoredSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Access token as stored, without an expiry check. Calls to the REST API
    /// go through [`Self::valid_access_token`] instead.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.session()
            .as_ref()
            .map(|stored| stored.access_token.clone())
    }

    /// Access token of the held session for row-level-security protected
    /// calls, refreshed first if it has expired. `None` when signed out.
    ///
    /// # Errors
    /// Returns the refresh failure; the session is ended and `SignedOut`
    /// announced before it is returned.
    pub async fn valid_access_token(&self) -> Result<Option<SecretString>, BackendError> {
        Ok(self
            .fresh_session()
            .await?
            .map(|(_, access_token)| access_token))
    }

    /// Held user and access token, refreshing an expired token first.
    async fn fresh_session(&self) -> Result<Option<(Session, SecretString)>, BackendError> {
        let refresh_token = {
            let guard = self.session();
            let Some(stored) = guard.as_ref() else {
                return Ok(None);
            };
            if !stored.is_expired(Utc::now().timestamp()) {
                return Ok(Some((stored.user.clone(), stored.access_token.clone())));
            }
            stored.refresh_token.clone()
        };

        debug!("access token expired, refreshing");
        match self.refresh(refresh_token).await {
            Ok(fresh) => Ok(Some(fresh)),
            Err(err) => {
                warn!("Token refresh failed, ending session: {err}");
                if self.clear() {
                    self.hub.notify(&SessionEvent::signed_out());
                }
                Err(err)
            }
        }
    }

    fn store(&self, stored: StoredSession) -> Session {
        let user = stored.user.clone();
        *self.session() = Some(stored);
        user
    }

    fn clear(&self) -> bool {
        self.session().take().is_some()
    }

    async fn refresh(
        &self,
        refresh_token: SecretString,
    ) -> Result<(Session, SecretString), BackendError> {
        let request = self
            .api
            .request(Method::POST, "/auth/v1/token?grant_type=refresh_token", None)?
            .json(&json!({ "refresh_token": refresh_token.expose_secret() }));
        let response: TokenResponse = self.api.send_json("auth.refresh", request).await?;

        let stored = StoredSession::from_response(response);
        let access_token = stored.access_token.clone();
        let session = self.store(stored);
        self.hub.notify(&SessionEvent::token_refreshed(session.clone()));
        Ok((session, access_token))
    }
}

#[async_trait]
impl SessionProvider for SupabaseAuth {
    /// Returns the held session, refreshing an expired access token first. A
    /// failed refresh ends the session.
    #[instrument(skip(self))]
    async fn get_current_session(&self) -> Result<Option<Session>, BackendError> {
        Ok(self.fresh_session().await?.map(|(session, _)| session))
    }

    fn subscribe_to_changes(&self, handler: SessionHandler) -> Subscription {
        self.hub.subscribe(handler)
    }

    #[instrument(skip_all)]
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<(), BackendError> {
        let request = self
            .api
            .request(Method::POST, "/auth/v1/signup", None)?
            .json(&json!({ "email": email, "password": password.expose_secret() }));

        // Auto-confirmed projects hand back a session here; sign-up never signs in.
        self.api.send("auth.signup", request).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, BackendError> {
        let request = self
            .api
            .request(Method::POST, "/auth/v1/token?grant_type=password", None)?
            .json(&json!({ "email": email, "password": password.expose_secret() }));
        let response: TokenResponse = self.api.send_json("auth.sign_in", request).await?;

        let session = self.store(StoredSession::from_response(response));
        self.hub.notify(&SessionEvent::signed_in(session.clone()));
        Ok(session)
    }

    /// Revokes the session server-side. The local session is cleared and
    /// `SignedOut` announced whatever the server answers.
    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), BackendError> {
        let access_token = self.access_token();
        let had_session = self.clear();
        if had_session {
            self.hub.notify(&SessionEvent::signed_out());
        }

        let Some(access_token) = access_token else {
            return Ok(());
        };

        let request = self
            .api
            .request(Method::POST, "/auth/v1/logout", Some(&access_token))?;
        if let Err(err) = self.api.send("auth.sign_out", request).await {
            warn!("Server-side sign-out failed: {err}");
            return Err(err);
        }
        Ok(())
    }
}
