//! Authentication service: login and registration against the backend, plus
//! persisting and clearing the resulting session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Calls go through `ApiClient`, so failures arrive as `ApiError` with the
//! server's message (e.g. "Invalid credentials") ready for display. Logging
//! in does not persist anything by itself; callers hand the response to
//! `set_user_data`.

use serde::{Deserialize, Serialize};

use crate::net::{ApiClient, ApiError, RequestOptions};
use crate::session::{SessionStore, StorageError, User};

const REGISTER_ENDPOINT: &str = "/auth/register";
const LOGIN_ENDPOINT: &str = "/auth/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Recruiter,
    Candidate,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recruiter => "recruiter",
            Self::Candidate => "candidate",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recruiter" => Ok(Self::Recruiter),
            "candidate" => Ok(Self::Candidate),
            other => Err(format!("unknown role '{other}' (expected 'recruiter' or 'candidate')")),
        }
    }
}

/// Body returned by both `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionStore,
}

impl AuthService {
    /// Uses the client's own session store.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `POST /auth/register {email, password, role}`.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` from the client.
    pub async fn register(&self, email: &str, password: &str, role: Role) -> Result<AuthResponse, ApiError> {
        let body = Credentials { email, password, role: Some(role) };
        self.api.post(REGISTER_ENDPOINT, &body, RequestOptions::new()).await
    }

    /// `POST /auth/login {email, password}`.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` from the client.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = Credentials { email, password, role: None };
        self.api.post(LOGIN_ENDPOINT, &body, RequestOptions::new()).await
    }

    /// Persist a login/registration result as the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session medium fails.
    pub fn set_user_data(&self, data: &AuthResponse) -> Result<(), StorageError> {
        self.session.set_session(&data.token, &data.user)?;
        tracing::info!(email = data.user.email.as_deref().unwrap_or(""), "session stored");
        Ok(())
    }

    /// Drop the local session. There is no server-side logout endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the session medium fails.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.session.clear_session()?;
        tracing::info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
