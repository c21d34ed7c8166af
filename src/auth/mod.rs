//! Shared credential store.
//!
//! Every request reads the access token from here; the reauthentication flow
//! rewrites it. Refreshes are serialized through `refresh_gate` so that callers
//! hitting 401 at the same time issue at most one refresh per stale token.

use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, MutexGuard};

use crate::models::TokenPair;

/// Header prefix for bearer authentication.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Access/refresh token pair shared by every clone of the client.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    tokens: Arc<RwLock<Option<TokenPair>>>,
    refresh_gate: Arc<Mutex<()>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly issued token pair.
    ///
    /// A pair without a refresh token keeps the previously stored one.
    pub fn store(&self, mut tokens: TokenPair) {
        let mut guard = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = guard.as_ref().and_then(|t| t.refresh_token.clone());
        }
        *guard = Some(tokens);
    }

    /// Forget all credentials, forcing a new login.
    pub fn clear(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().map(|t| t.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().and_then(|t| t.refresh_token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// `Authorization` header value for the current access token.
    pub fn authorization_header(&self) -> Option<String> {
        self.access_token()
            .map(|token| format!("{}{}", BEARER_PREFIX, token))
    }

    /// Wait for exclusive use of the refresh flow.
    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_gate.lock().await
    }

    fn read(&self) -> Option<TokenPair> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
