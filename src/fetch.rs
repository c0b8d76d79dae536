//! HTTP helper for the read-only providers (countries, weather)

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Helper for building and executing one provider request
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: Vec::new(),
        }
    }

    /// Add a query parameter to the request
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    fn build_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Execute the request and parse the response as JSON
    ///
    /// Transport failures and non-success statuses both surface as
    /// [`Error::Network`].
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.build_url()?;
        let mut logged = url.clone();
        logged.set_query(None);
        let params: Vec<&str> = self.query_params.iter().map(|(k, _)| k.as_str()).collect();
        debug!(method = %self.method, url = %logged, ?params, "provider request");

        // query values may carry credentials; keep the URL out of errors
        let response = self
            .client
            .request(self.method, url)
            .headers(self.headers)
            .send()
            .await
            .map_err(|e| Error::network(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::network(format!(
                "Request failed with status {}: {}",
                status, text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::network(e.without_url()))
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }
}
