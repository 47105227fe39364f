//! REST client for the realtime database
//!
//! Every node is addressable as `{database_url}/{path}.json`. Writes are
//! `PUT` (full overwrite), reads are `GET`; a JSON `null` body means nothing
//! is stored at the path.

use crate::auth::{ServiceAccountTokenProvider, TokenProvider};
use crate::client::{normalize_path, path_segments, DatabaseClient};
use crate::config::credentials::ServiceAccountKey;
use crate::config::ClientConfig;
use crate::error::{Result, SensorError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Connection handle to one realtime database
#[derive(Clone)]
pub struct RealtimeDatabase {
    /// HTTP client instance
    http: Client,

    /// Database root URL
    base_url: Url,

    /// Bearer token source
    tokens: Arc<dyn TokenProvider>,
}

impl RealtimeDatabase {
    /// Load the service-account key and open a connection handle.
    ///
    /// Fails with a configuration error when the credential file is missing
    /// or invalid; no network request is made here.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let key = ServiceAccountKey::load(&config.credential_path)?;
        config.validate()?;
        let http = Self::build_http_client(config)?;
        let tokens = ServiceAccountTokenProvider::new(&key, http.clone(), config.token_refresh_margin)?;

        info!(
            "Connecting to realtime database at {} as {}",
            config.database_url,
            tokens.client_email()
        );

        Ok(Self::with_token_provider(
            config.database_url.clone(),
            http,
            Arc::new(tokens),
        ))
    }

    /// Build a handle from parts, e.g. to use a pre-minted token
    pub fn with_token_provider(database_url: Url, http: Client, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            base_url: database_url,
            tokens,
        }
    }

    /// HTTP client configured from the connection settings
    pub fn build_http_client(config: &ClientConfig) -> Result<Client> {
        ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SensorError::configuration(format!("Failed to build HTTP client: {e}")))
    }

    /// Database root URL
    pub fn database_url(&self) -> &Url {
        &self.base_url
    }

    /// REST URL of the node at `path`
    pub fn node_url(&self, path: &str) -> Result<Url> {
        let mut segments: Vec<String> = path_segments(path).into_iter().map(String::from).collect();
        match segments.last_mut() {
            Some(last) => last.push_str(".json"),
            None => segments.push(".json".to_string()),
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SensorError::configuration(format!("Database URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments.iter());
        Ok(url)
    }

    /// Attach credentials, send, and map non-success statuses to errors
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);

        Err(match status.as_u16() {
            401 | 403 => SensorError::authentication(format!("{status}: {message}")),
            code => SensorError::remote(code, message),
        })
    }
}

#[async_trait]
impl DatabaseClient for RealtimeDatabase {
    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        let url = self.node_url(path)?;
        debug!("PUT {}", normalize_path(path));

        self.execute(self.http.put(url).query(&[("print", "silent")]).json(value))
            .await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let url = self.node_url(path)?;
        debug!("GET {}", normalize_path(path));

        let response = self.execute(self.http.get(url)).await?;
        let value: Value = response.json().await?;
        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }
}

impl std::fmt::Debug for RealtimeDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeDatabase")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
