//! # Token Store
//!
//! Keeps the access/refresh pair issued at login in durable, app-scoped
//! key-value storage so later requests can read it back.
//!
//! ## Layers
//!
//! - [`Preferences`]: a namespaced string key-value store. Reads are served
//!   from memory; an edit is visible immediately and reaches disk later.
//! - [`TokenStore`]: the two well-known keys on top of a `Preferences`.
//!
//! ## Implementations
//!
//! - `sqlite::SqlitePreferences` - durable, one SQLite file per install
//! - `memory::MemoryPreferences` - process memory only
//!
//! ## Caveats
//!
//! Nothing expires tokens and nothing refreshes them. Two sessions sharing
//! one store can interleave their saves; the last edit applied wins.

pub mod memory;
pub mod sqlite;

use std::fmt;
use std::sync::Arc;

use crate::shared::SessionTokens;

pub use memory::MemoryPreferences;
pub use sqlite::SqlitePreferences;

/// Namespace the token keys live under
pub const AUTH_PREFERENCES: &str = "AuthPrefs";

pub const ACCESS_TOKEN_KEY: &str = "ACCESS_TOKEN";
pub const REFRESH_TOKEN_KEY: &str = "REFRESH_TOKEN";

/// One entry of a preferences edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceChange {
    Put { key: String, value: String },
    Remove { key: String },
}

impl PreferenceChange {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// App-scoped string key-value storage
pub trait Preferences: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Apply a batch of changes. Visible to `get` on return; persistence,
    /// if any, completes in the background.
    fn apply(&self, changes: Vec<PreferenceChange>);
}

/// Access/refresh token persistence
#[derive(Clone)]
pub struct TokenStore {
    prefs: Arc<dyn Preferences>,
}

impl TokenStore {
    pub fn new(prefs: Arc<dyn Preferences>) -> Self {
        Self { prefs }
    }

    /// Token store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::new()))
    }

    /// Overwrite both tokens
    pub fn save(&self, tokens: &SessionTokens) {
        tracing::debug!("[STORE] Saving session tokens");
        self.prefs.apply(vec![
            PreferenceChange::put(ACCESS_TOKEN_KEY, tokens.access_token.clone()),
            PreferenceChange::put(REFRESH_TOKEN_KEY, tokens.refresh_token.clone()),
        ]);
    }

    /// Both tokens, or `None` unless both keys are present
    pub fn load(&self) -> Option<SessionTokens> {
        let access_token = self.prefs.get(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.prefs.get(REFRESH_TOKEN_KEY)?;
        Some(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// The access token alone, as read when decorating a request
    pub fn access_token(&self) -> Option<String> {
        self.prefs.get(ACCESS_TOKEN_KEY)
    }

    pub fn clear(&self) {
        tracing::debug!("[STORE] Clearing session tokens");
        self.prefs.apply(vec![
            PreferenceChange::remove(ACCESS_TOKEN_KEY),
            PreferenceChange::remove(REFRESH_TOKEN_KEY),
        ]);
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_access_token", &self.access_token().is_some())
            .finish()
    }
}
