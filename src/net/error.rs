//! Normalized error: the only failure shape the HTTP client surfaces.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;

use super::transport::{TransportError, TransportResponse};

pub const FALLBACK_MESSAGE: &str = "API Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Network unreachable, connection reset, or similar; no response.
    Network,
    /// The per-request timeout elapsed; no response.
    Timeout,
    /// The server answered with a non-2xx status.
    Status,
    /// A 2xx body did not match the type the caller asked for.
    Decode,
    /// The request could not be built (bad endpoint, bad body).
    InvalidRequest,
}

/// Raw response retained on the error for callers that need headers.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl From<&TransportResponse> for RawResponse {
    fn from(resp: &TransportResponse) -> Self {
        Self {
            status: resp.status,
            headers: resp.headers.clone(),
            body: String::from_utf8_lossy(&resp.body).into_owned(),
        }
    }
}

/// `message` is never empty.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
    pub response: Option<RawResponse>,
}

impl ApiError {
    /// A non-2xx response. The server's `message` field wins over the
    /// generic status text.
    #[must_use]
    pub fn from_status(resp: &TransportResponse) -> Self {
        let data = parse_body(&resp.body);
        let fallback = status_failed_message(resp.status.as_u16());
        Self {
            kind: ApiErrorKind::Status,
            message: pick_message(data.as_ref(), Some(&fallback)),
            status: Some(resp.status.as_u16()),
            data,
            response: Some(RawResponse::from(resp)),
        }
    }

    #[must_use]
    pub fn from_transport(err: &TransportError) -> Self {
        let kind = match err {
            TransportError::Timeout(_) => ApiErrorKind::Timeout,
            TransportError::Build(_) => ApiErrorKind::InvalidRequest,
            TransportError::Connect(_) | TransportError::Request(_) => ApiErrorKind::Network,
        };
        Self {
            kind,
            message: pick_message(None, Some(&err.to_string())),
            status: None,
            data: None,
            response: None,
        }
    }

    #[must_use]
    pub fn decode(resp: &TransportResponse, err: &serde_json::Error) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: pick_message(None, Some(&format!("response decode failed: {err}"))),
            status: Some(resp.status.as_u16()),
            data: parse_body(&resp.body),
            response: Some(RawResponse::from(resp)),
        }
    }

    #[must_use]
    pub fn invalid_request(message: &str) -> Self {
        Self {
            kind: ApiErrorKind::InvalidRequest,
            message: pick_message(None, Some(message)),
            status: None,
            data: None,
            response: None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

pub(crate) fn status_failed_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

/// Server `message` field, then the transport message, then the fixed fallback.
pub(crate) fn pick_message(data: Option<&Value>, transport_message: Option<&str>) -> String {
    data.and_then(|d| d.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .or_else(|| transport_message.filter(|m| !m.is_empty()))
        .unwrap_or(FALLBACK_MESSAGE)
        .to_owned()
}

/// JSON when the body parses, the text itself otherwise, nothing when empty.
pub(crate) fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
