//! Remote data gateway
//!
//! One outbound request per operation, no retries and no caching. Every
//! failure comes back as a typed [`Error`].

mod countries;
mod rows;
mod weather;

use std::sync::Arc;

use async_trait::async_trait;
use atlas_auth::{Auth, AuthOptions, Session, SignInCredentials};
use reqwest::Client;
use tokio::sync::watch;

use crate::config::AtlasConfig;
use crate::error::Result;
use crate::model::{Country, DataTable, WeatherSnapshot};
use crate::row::TestRow;

/// Countries provider
#[async_trait]
pub trait CountriesApi: Send + Sync {
    /// The full collection; the provider does not paginate
    async fn list_countries(&self) -> Result<Vec<Country>>;
}

/// Weather provider
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Current conditions for a non-empty city name
    async fn get_weather(&self, city: &str) -> Result<WeatherSnapshot>;
}

/// Backend test tables
#[async_trait]
pub trait RowsApi: Send + Sync {
    async fn list_rows(&self, table: DataTable) -> Result<Vec<TestRow>>;

    /// Insert one row and return it as stored
    async fn insert_row(&self, table: DataTable, row: &TestRow) -> Result<TestRow>;
}

/// Gateway to every external service
pub struct Gateway {
    config: Arc<AtlasConfig>,
    http_client: Client,
    auth: Arc<Auth>,
}

impl Gateway {
    /// Create a gateway from configuration
    pub fn new(config: AtlasConfig) -> Result<Self> {
        let http_client = config.http_client()?;
        let auth = Auth::new(
            config.supabase_url.as_str(),
            &config.anon_key,
            http_client.clone(),
            AuthOptions::default(),
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
            auth: Arc::new(auth),
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let credentials = SignInCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        Ok(self.auth.sign_in_with_password(&credentials).await?)
    }

    /// Sign out; the local session is cleared even if the provider is unreachable
    pub async fn sign_out(&self) {
        self.auth.sign_out().await
    }

    /// Current session, if one exists and has not expired
    pub fn session(&self) -> Option<Session> {
        self.auth.get_session().filter(|s| !s.is_expired())
    }

    /// Session changes, starting with the current value
    pub fn watch_session(&self) -> watch::Receiver<Option<Session>> {
        self.auth.on_auth_state_change()
    }
}
