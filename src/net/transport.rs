//! Transport seam between the API client and the wire.
//!
//! DESIGN
//! ======
//! `ApiClient` builds a fully-resolved `TransportRequest` (URL, headers,
//! timeout) and hands it to a `Transport`. Production uses `ReqwestTransport`;
//! tests substitute a recording fake so the request pipeline can be checked
//! without a network.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode, Url};

use super::progress::{ProgressEvent, ProgressSink, counted_chunks};
use super::request::{FormData, RequestBody};
use crate::config::ClientConfig;

// =============================================================================
// TYPES
// =============================================================================

/// Transport failures: no response was received.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Connect(String),
    #[error("{0}")]
    Request(String),
    #[error("{0}")]
    Build(String),
}

pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub timeout: Duration,
    pub upload_progress: Option<ProgressSink>,
}

/// Any status, including non-2xx. Classification is the client's job.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .cookie_store(config.with_credentials)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest { method, url, mut headers, body, timeout, upload_progress } = request;
        let builder = self.http.request(method, url).timeout(timeout);

        let builder = match body {
            RequestBody::Empty => builder.headers(headers),
            RequestBody::Json(value) => {
                let raw = serde_json::to_vec(&value).map_err(|e| TransportError::Build(e.to_string()))?;
                builder.headers(headers).body(raw)
            }
            RequestBody::Multipart(form) => {
                // reqwest supplies the boundary-qualified content type.
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(multipart_form(form, upload_progress)?)
            }
        };

        let response = builder.send().await.map_err(|e| classify(&e, timeout))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| classify(&e, timeout))?.to_vec();

        Ok(TransportResponse { status, headers, body })
    }
}

fn multipart_form(form: FormData, sink: Option<ProgressSink>) -> Result<Form, TransportError> {
    let total = form.total_len();
    let loaded = Arc::new(AtomicU64::new(0));
    let mut out = Form::new();

    // No chunk will ever be polled, so report completion up front.
    if total == 0 {
        if let Some(sink) = &sink {
            sink(ProgressEvent { loaded: 0, total: 0 });
        }
    }

    for part in form.parts {
        let len = part.bytes.len() as u64;
        let stream = counted_chunks(part.bytes, loaded.clone(), total, sink.clone());
        let mut body = Part::stream_with_length(reqwest::Body::wrap_stream(stream), len);
        if let Some(filename) = part.filename {
            body = body.file_name(filename);
        }
        if let Some(content_type) = part.content_type {
            body = body
                .mime_str(&content_type)
                .map_err(|e| TransportError::Build(format!("invalid content type {content_type:?}: {e}")))?;
        }
        out = out.part(part.name, body);
    }

    Ok(out)
}

pub(crate) fn timeout_message(timeout: Duration) -> String {
    format!("timeout of {}ms exceeded", timeout.as_millis())
}

fn classify(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout_message(timeout))
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_builder() {
        TransportError::Build(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
