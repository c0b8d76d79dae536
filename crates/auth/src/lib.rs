//! Session client for the atlas authentication provider
//!
//! This crate signs a user in with email and password, keeps the resulting
//! session in memory, and exposes it reactively so the rest of the
//! application can follow sign-in and sign-out without polling.

use chrono::Utc;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

/// Errors raised by the authentication client
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing session")]
    MissingSession,

    #[error("Session expired")]
    SessionExpired,
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Session issued by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Unix timestamp (seconds) after which the access token is rejected
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub user: User,
}

impl Session {
    /// Fill in `expires_at` from `expires_in` when the provider omitted it
    fn stamp_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }

    /// The signed-in user's email, if the provider reported one
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }
}

/// Sign-in credentials
#[derive(Debug, Clone, Serialize)]
pub struct SignInCredentials {
    pub email: String,
    pub password: String,
}

/// Client options
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Keep the session returned by sign-in as the current session
    pub persist_session: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
        }
    }
}

/// Error body returned by the provider; different endpoints fill different fields
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn api_error(body: String) -> AuthError {
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error));
    AuthError::ApiError(message.unwrap_or(body))
}

/// Auth client
pub struct Auth {
    url: String,
    key: String,
    http_client: Client,
    options: AuthOptions,
    current_session: watch::Sender<Option<Session>>,
}

impl Auth {
    /// Create a new Auth client
    pub fn new(url: &str, key: &str, http_client: Client, options: AuthOptions) -> Self {
        let (current_session, _) = watch::channel(None);
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            options,
            current_session,
        }
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(
        &self,
        credentials: &SignInCredentials,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.url);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(api_error(error_text));
        }

        let session = response.json::<Session>().await?.stamp_expiry();
        info!(
            "Signed in as {}",
            session.email().unwrap_or(session.user.id.as_str())
        );

        if self.options.persist_session {
            self.current_session.send_replace(Some(session.clone()));
        }

        Ok(session)
    }

    /// Sign out
    ///
    /// The local session is cleared before the provider is contacted, so this
    /// always succeeds locally. Calling it without a session does nothing.
    pub async fn sign_out(&self) {
        let Some(session) = self.current_session.send_replace(None) else {
            debug!("sign_out called without a session");
            return;
        };
        info!(
            "Signed out {}",
            session.email().unwrap_or(session.user.id.as_str())
        );

        let url = format!("{}/auth/v1/logout", self.url);
        let result = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .bearer_auth(&session.access_token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!("Remote sign-out returned {}", response.status()),
            Err(err) => warn!("Remote sign-out failed: {}", err),
        }
    }

    /// Get the current session, expired or not
    pub fn get_session(&self) -> Option<Session> {
        self.current_session.borrow().clone()
    }

    /// Replace the current session, e.g. with one restored from elsewhere
    pub fn set_session(&self, session: Option<Session>) {
        self.current_session
            .send_replace(session.map(Session::stamp_expiry));
    }

    /// Access token of a live session
    pub fn access_token(&self) -> Result<String, AuthError> {
        let guard = self.current_session.borrow();
        let session = guard.as_ref().ok_or(AuthError::MissingSession)?;
        if session.is_expired() {
            return Err(AuthError::SessionExpired);
        }
        Ok(session.access_token.clone())
    }

    /// Subscribe to session changes
    ///
    /// The receiver yields the current value immediately and is notified on
    /// every sign-in and sign-out.
    pub fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>> {
        self.current_session.subscribe()
    }
}
