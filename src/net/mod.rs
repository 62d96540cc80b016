//! Networking: the session-aware API client and its transport.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the single choke point for backend calls, `transport` abstracts
//! the wire, `error` defines the one failure shape callers see, `request`
//! and `progress` carry per-call options and upload reporting.

pub mod api;
pub mod error;
pub mod progress;
pub mod request;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use api::ApiClient;
pub use error::{ApiError, ApiErrorKind, RawResponse};
pub use progress::{ProgressCallback, ProgressEvent};
pub use request::{FormData, FormPart, RequestBody, RequestOptions};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse};
