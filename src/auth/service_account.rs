//! OAuth2 JWT-bearer flow for service accounts
//!
//! A short-lived RS256 assertion signed with the account's private key is
//! exchanged at the key's `token_uri` for an access token. The token is cached
//! and reused until it comes within `refresh_margin` of its expiry.

use crate::auth::TokenProvider;
use crate::config::credentials::ServiceAccountKey;
use crate::error::{Result, SensorError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Scopes required to read and write the realtime database
pub const DATABASE_SCOPES: &str =
    "https://www.googleapis.com/auth/firebase.database https://www.googleapis.com/auth/userinfo.email";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now.checked_add_signed(margin)
            .is_some_and(|deadline| deadline < self.expires_at)
    }
}

/// Token provider backed by a service-account key
pub struct ServiceAccountTokenProvider {
    http: reqwest::Client,
    client_email: String,
    token_uri: String,
    key_id: Option<String>,
    encoding_key: EncodingKey,
    refresh_margin: Duration,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    /// Create a provider; fails if the private key is not a valid RSA PEM
    pub fn new(
        key: &ServiceAccountKey,
        http: reqwest::Client,
        refresh_margin: std::time::Duration,
    ) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            SensorError::configuration(format!("Invalid service-account private key: {e}"))
        })?;

        let refresh_margin = Duration::from_std(refresh_margin).map_err(|e| {
            SensorError::configuration(format!("Invalid token refresh margin: {e}"))
        })?;

        Ok(Self {
            http,
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            key_id: key.private_key_id.clone(),
            encoding_key,
            refresh_margin,
            cached: RwLock::new(None),
        })
    }

    /// Account the tokens are issued for
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: DATABASE_SCOPES,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SensorError::authentication(format!("Failed to sign assertion: {e}")))
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        debug!("Requesting access token for {}", self.client_email);

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SensorError::authentication(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!("Access token issued, expires in {}s", token.expires_in);

        let expires_at = Duration::try_seconds(token.expires_in)
            .filter(|lifetime| *lifetime >= Duration::zero())
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                SensorError::authentication(format!(
                    "Token endpoint returned invalid expires_in: {}",
                    token.expires_in
                ))
            })?;

        Ok(CachedToken {
            token: token.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_fresh(Utc::now(), self.refresh_margin) {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now(), self.refresh_margin) {
                return Ok(token.token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}

impl std::fmt::Debug for ServiceAccountTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenProvider")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
