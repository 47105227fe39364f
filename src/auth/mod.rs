//! Access tokens for the realtime database
//!
//! The database accepts OAuth2 bearer tokens. [`ServiceAccountTokenProvider`]
//! obtains them from a service-account key; [`StaticTokenProvider`] hands out a
//! fixed token (local emulator, pre-minted tokens, tests).

pub mod service_account;

pub use service_account::ServiceAccountTokenProvider;

use crate::error::Result;
use async_trait::async_trait;

/// Source of bearer tokens for database requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token valid for at least the next request
    async fn access_token(&self) -> Result<String>;
}

/// Token provider that always returns the same token
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
