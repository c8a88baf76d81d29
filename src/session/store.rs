//! Session store: current workspace and credential reset.

use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::token_store::{TokenStore, TokenStoreError};
use crate::request::ScopeId;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to reset credentials: {0}")]
    Reset(#[from] TokenStoreError),
}

/// Login/session state consumed by the gateway.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current workspace id, if one is selected.
    fn current_scope_id(&self) -> Option<ScopeId>;

    /// Drops the stored credentials so the next request is unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the credentials could not be cleared.
    async fn reset_token(&self) -> Result<(), SessionError>;
}

/// Session backed by a [`TokenStore`] and an in-memory workspace selection.
pub struct LocalSession {
    scope_id: RwLock<Option<ScopeId>>,
    tokens: Arc<dyn TokenStore>,
    token_key: String,
}

impl std::fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSession")
            .field("scope_id", &self.current_scope_id())
            .field("token_key", &self.token_key)
            .finish_non_exhaustive()
    }
}

impl LocalSession {
    pub fn new(tokens: Arc<dyn TokenStore>, token_key: impl Into<String>) -> Self {
        Self {
            scope_id: RwLock::new(None),
            tokens,
            token_key: token_key.into(),
        }
    }

    #[must_use]
    pub fn with_scope_id(self, scope_id: ScopeId) -> Self {
        self.set_scope_id(Some(scope_id));
        self
    }

    /// Switches the current workspace.
    pub fn set_scope_id(&self, scope_id: Option<ScopeId>) {
        if let Ok(mut guard) = self.scope_id.write() {
            *guard = scope_id;
        }
    }
}

#[async_trait]
impl SessionStore for LocalSession {
    fn current_scope_id(&self) -> Option<ScopeId> {
        self.scope_id.read().map(|guard| *guard).unwrap_or_default()
    }

    async fn reset_token(&self) -> Result<(), SessionError> {
        self.tokens.remove(&self.token_key)?;
        info!(key = %self.token_key, "stored credentials cleared");
        Ok(())
    }
}
