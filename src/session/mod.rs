//! Session store: the bearer token and user record for the current client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The HTTP client reads the token on every dispatch, the route guard reads
//! token presence before every navigation, and the auth service writes the
//! session after a successful login or registration.
//!
//! INVARIANT
//! =========
//! A user is only ever observable while a token is stored. Writes put the
//! token down before the user; clears remove the user before the token; and
//! `get_user` reports nothing once the token is gone.

pub mod storage;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// The user record returned by the backend alongside a token.
///
/// Only `email` and `role` are interpreted; everything else the backend sends
/// is kept verbatim in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl User {
    /// Backend identifier, under either `id` or `_id`.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.fields.get("id").or_else(|| self.fields.get("_id"))
    }
}

/// Snapshot of what is currently stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

/// Shared handle over a key-value medium. Clones see the same storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Self { storage: Arc::new(storage) }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Overwrite the stored session wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be serialized or the medium fails.
    pub fn set_session(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user)?;
        self.storage.set_item(TOKEN_KEY, token)?;
        self.storage.set_item(USER_KEY, &user_json)
    }

    /// The stored token. An empty stored value counts as absent.
    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn get_user(&self) -> Option<User> {
        self.get_token()?;
        let raw = self.storage.get_item(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "stored user record is unreadable");
                None
            }
        }
    }

    /// Remove both fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium fails to persist a removal.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(TOKEN_KEY)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    #[must_use]
    pub fn session(&self) -> Session {
        Session { token: self.get_token(), user: self.get_user() }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
