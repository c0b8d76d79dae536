//! Configuration for the country atlas client

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{Error, Result};

/// Default countries provider
pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1";

/// Default weather provider
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Endpoints and credentials for the external services
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Base URL of the backend project (auth and tables)
    pub supabase_url: Url,

    /// Anonymous API key of the backend project
    pub anon_key: String,

    /// Base URL of the countries provider
    pub countries_url: Url,

    /// Base URL of the weather provider
    pub weather_url: Url,

    /// Weather provider key, sent as `appid` when present
    pub weather_api_key: Option<String>,

    /// Units requested from the weather provider
    pub weather_units: String,

    /// The request timeout; `None` leaves the HTTP client default in place
    pub request_timeout: Option<Duration>,
}

fn parse_url(name: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::config(format!("{} is not a valid URL: {}", name, e)))
}

impl AtlasConfig {
    /// Create a configuration with default providers
    pub fn new(supabase_url: &str, anon_key: impl Into<String>) -> Result<Self> {
        let anon_key = anon_key.into();
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }

        Ok(Self {
            supabase_url: parse_url("SUPABASE_URL", supabase_url)?,
            anon_key,
            countries_url: parse_url("COUNTRIES_API_URL", DEFAULT_COUNTRIES_URL)?,
            weather_url: parse_url("WEATHER_API_URL", DEFAULT_WEATHER_URL)?,
            weather_api_key: None,
            weather_units: "metric".to_string(),
            request_timeout: None,
        })
    }

    /// Read the configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;

        let mut config = Self::new(&url, key)?;
        if let Ok(value) = std::env::var("COUNTRIES_API_URL") {
            config = config.with_countries_url(&value)?;
        }
        if let Ok(value) = std::env::var("WEATHER_API_URL") {
            config = config.with_weather_url(&value)?;
        }
        if let Ok(value) = std::env::var("WEATHER_UNITS") {
            config = config.with_weather_units(&value);
        }
        config = config.with_weather_api_key(std::env::var("WEATHER_API_KEY").ok());
        Ok(config)
    }

    /// Set the countries provider
    pub fn with_countries_url(mut self, value: &str) -> Result<Self> {
        self.countries_url = parse_url("COUNTRIES_API_URL", value)?;
        Ok(self)
    }

    /// Set the weather provider
    pub fn with_weather_url(mut self, value: &str) -> Result<Self> {
        self.weather_url = parse_url("WEATHER_API_URL", value)?;
        Ok(self)
    }

    /// Set the weather provider key
    pub fn with_weather_api_key(mut self, value: Option<String>) -> Self {
        self.weather_api_key = value.filter(|k| !k.is_empty());
        self
    }

    /// Set the weather units
    pub fn with_weather_units(mut self, value: &str) -> Self {
        self.weather_units = value.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Build the shared HTTP client
    pub fn http_client(&self) -> Result<Client> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| Error::config(format!("HTTP client: {}", e)))
    }
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn endpoint(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
