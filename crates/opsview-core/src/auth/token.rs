use std::future::Future;

use tokio::sync::Mutex;

use crate::error::Result;

/// Auth token cached for the lifetime of a client.
///
/// The first caller to need a token performs the login while holding the
/// lock, so concurrent callers wait for that login instead of starting their
/// own. A failed login leaves the cache empty. Tokens are never refreshed.
#[derive(Debug, Default)]
pub struct TokenCache {
    token: Mutex<Option<String>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token, running `fetch` to obtain one if absent.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let mut guard = self.token.lock().await;
        if let Some(ref token) = *guard {
            return Ok(token.clone());
        }

        let token = fetch().await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    /// The cached token, if a login has succeeded.
    pub async fn cached(&self) -> Option<String> {
        self.token.lock().await.clone()
    }
}
