//! Client-side core of the CV analysis app: a session-aware HTTP client, the
//! session store it reads tokens from, the auth service that fills that
//! store, and the route table whose guard consults it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` is the leaf. `net` reads it on every dispatch; `auth` writes it
//! after login or registration; `router` reads it before each navigation.

pub mod auth;
pub mod config;
pub mod net;
pub mod router;
pub mod session;

pub use auth::{AuthResponse, AuthService, Role};
pub use config::{ClientConfig, ConfigError, RunMode};
pub use net::{ApiClient, ApiError, ApiErrorKind, FormData, RequestOptions};
pub use router::{Router, RouteError};
pub use session::{FileStore, MemoryStore, SessionStore, User};
