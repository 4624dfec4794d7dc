//! HTTP implementation of the source client

use super::SourceClient;
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, ResourceKind};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Header carrying the provider credential
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// football-data.org style REST client
pub struct HttpSourceClient {
    client: Client,
    base_url: String,
    season: Option<u32>,
    timeout: Duration,
}

impl HttpSourceClient {
    /// Build a client from source settings
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut token = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::invalid_value("FOOTBALL_API_KEY", "contains invalid characters"))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, token);

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("football-etl/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        // Validated here so a bad base URL surfaces before the first request
        Url::parse(&config.base_url)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            season: config.season,
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn season(&self) -> Option<u32> {
        self.season
    }

    /// Full URL of a resource document
    pub fn resource_url(&self, resource: ResourceKind, competition: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/competitions/{competition}/{resource}",
            self.base_url
        ))?;
        if let Some(season) = self.season {
            url.query_pairs_mut().append_pair("season", &season.to_string());
        }
        Ok(url)
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch(&self, resource: ResourceKind, competition: &str) -> Result<JsonValue> {
        let url = self.resource_url(resource, competition)?;
        info!("Making request to: {url}");

        let response = self.client.get(url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out after {}s", self.timeout.as_secs())
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                e.to_string()
            };
            Error::source(resource, competition, message)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::source_status(
                resource,
                competition,
                status.as_u16(),
                body,
            ));
        }

        let document: JsonValue = response.json().await.map_err(|e| {
            Error::source(resource, competition, format!("invalid JSON body: {e}"))
        })?;
        debug!("Fetched {resource} document for {competition}");

        Ok(document)
    }
}

impl std::fmt::Debug for HttpSourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSourceClient")
            .field("base_url", &self.base_url)
            .field("season", &self.season)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
