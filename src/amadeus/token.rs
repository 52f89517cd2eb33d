//! Access-token cache with a refresh buffer.

use anyhow::Result;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Tokens are refreshed this long before they actually expire.
pub const REFRESH_BUFFER: Duration = Duration::from_secs(60);

/// Upper bound on how long an issued token is trusted.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// A freshly issued token and its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: Duration,
}

impl IssuedToken {
    pub fn new(access_token: impl Into<String>, expires_in: Duration) -> Self {
        Self { access_token: access_token.into(), expires_in }
    }
}

#[derive(Debug, Clone)]
enum TokenState {
    Empty,
    Populated { token: String, expires_at: Instant },
}

/// Caches one bearer token for all requests of a client.
///
/// Refreshes are serialized behind an async mutex, so callers racing on an
/// expired token trigger a single refresh and then share its result.
#[derive(Debug)]
pub struct TokenCache {
    state: Mutex<TokenState>,
    buffer: Duration,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_buffer(REFRESH_BUFFER)
    }

    pub fn with_buffer(buffer: Duration) -> Self {
        Self { state: Mutex::new(TokenState::Empty), buffer }
    }

    /// Returns the cached token, calling `refresh` when it is missing or about to expire.
    pub async fn get<F, Fut>(&self, refresh: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken>>,
    {
        self.get_at(Instant::now(), refresh).await
    }

    /// Like [`TokenCache::get`] with an explicit clock reading.
    pub async fn get_at<F, Fut>(&self, now: Instant, refresh: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken>>,
    {
        let mut state = self.state.lock().await;

        if let TokenState::Populated { token, expires_at } = &*state {
            if expires_at.checked_sub(self.buffer).is_some_and(|fresh_until| fresh_until > now) {
                return Ok(token.clone());
            }
            debug!("Access token inside refresh buffer");
        }

        // A failed refresh leaves the previous state untouched
        let issued = refresh().await?;
        let lifetime = issued.expires_in.min(MAX_TOKEN_LIFETIME);
        debug!("Caching access token for {}s", lifetime.as_secs());

        *state = TokenState::Populated {
            token: issued.access_token.clone(),
            expires_at: now.checked_add(lifetime).unwrap_or(now),
        };

        Ok(issued.access_token)
    }

    /// Drops the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.state.lock().await = TokenState::Empty;
    }
}
