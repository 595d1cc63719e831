//! The session model and an in-memory store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::tokens::{AccessToken, RefreshToken, TokenPair};
use crate::traits::{SessionKey, SessionStore};

/// Profile of the signed-in user, as returned by login.
///
/// Fields other than the typed ones are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A snapshot of the session entries held by a [`SessionStore`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
    pub user: Option<UserSummary>,
}

impl Session {
    /// Read the current session from a store.
    ///
    /// A `user` entry that is not valid JSON is treated as absent.
    pub fn load(store: &dyn SessionStore) -> Self {
        let user = store.get(SessionKey::User).and_then(|raw| {
            serde_json::from_str(&raw)
                .inspect_err(|e| warn!(error = %e, "Ignoring malformed stored user"))
                .ok()
        });

        Self {
            access_token: store.get(SessionKey::AccessToken).map(AccessToken::new),
            refresh_token: store.get(SessionKey::RefreshToken).map(RefreshToken::new),
            user,
        }
    }

    /// Write a freshly opened session.
    pub fn save_login(
        store: &dyn SessionStore,
        tokens: &TokenPair,
        user: &UserSummary,
    ) -> serde_json::Result<()> {
        let user = serde_json::to_string(user)?;
        store.set_many(&[
            (SessionKey::AccessToken, tokens.access_token.as_str()),
            (SessionKey::RefreshToken, tokens.refresh_token.as_str()),
            (SessionKey::User, user.as_str()),
        ]);
        Ok(())
    }

    /// Write a renewed token pair, leaving the user entry alone.
    pub fn save_tokens(store: &dyn SessionStore, tokens: &TokenPair) {
        store.set_many(&[
            (SessionKey::AccessToken, tokens.access_token.as_str()),
            (SessionKey::RefreshToken, tokens.refresh_token.as_str()),
        ]);
    }

    /// True if an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<SessionKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&key).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, value.to_string());
    }

    fn remove(&self, key: SessionKey) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key);
    }
}
