//! Shared HTTP client that attaches the session bearer token.

use reqwest::{Client, RequestBuilder};
use std::sync::{Arc, RwLock};

/// Handle to the remote API: base URL, shared connection pool, and the
/// current bearer token. Clones share the token slot, so uploads spawned
/// concurrently all see a token installed or cleared by the worker.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Build a client for the given base URL with an optional token
    /// restored from the persisted session.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            token: Arc::new(RwLock::new(token)),
        }
    }

    /// Install the bearer token after a successful login.
    pub fn set_token(&self, token: String) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token);
        }
    }

    /// Drop the bearer token on logout.
    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request with the bearer token attached when present.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.http.get(self.url(path)))
    }

    /// POST request with the bearer token attached when present.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.http.post(self.url(path)))
    }

    fn with_auth(&self, rb: RequestBuilder) -> RequestBuilder {
        let token = self.token.read().ok().and_then(|t| t.clone());
        match token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let c = ApiClient::new("https://api.example.com/", None);
        assert_eq!(c.url("/stores"), "https://api.example.com/stores");
    }

    #[test]
    fn token_slot_is_shared_between_clones() {
        let a = ApiClient::new("https://api.example.com", None);
        let b = a.clone();
        assert!(!b.has_token());
        a.set_token("tok".into());
        assert!(b.has_token());
        b.clear_token();
        assert!(!a.has_token());
    }
}
