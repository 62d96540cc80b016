//! Recording fake transport shared by client and auth tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use super::progress::ProgressEvent;
use super::request::RequestBody;
use super::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use crate::config::{ClientConfig, RunMode};
use crate::net::ApiClient;
use crate::session::SessionStore;

/// What the fake saw for one dispatched request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub timeout: Duration,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Replays queued outcomes in order; an empty queue answers `200 null`.
/// Multipart requests additionally receive the configured progress events.
#[derive(Default)]
pub struct FakeTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    progress: Vec<(u64, u64)>,
    recorded: Mutex<Vec<Recorded>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_progress(events: Vec<(u64, u64)>) -> Arc<Self> {
        Arc::new(Self { progress: events, ..Self::default() })
    }

    pub fn respond_json(&self, status: u16, body: &Value) {
        self.respond_raw(status, serde_json::to_vec(body).unwrap());
    }

    pub fn respond_raw(&self, status: u16, body: Vec<u8>) {
        let response = TransportResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body,
        };
        self.outcomes.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail(&self, err: TransportError) {
        self.outcomes.lock().unwrap().push_back(Err(err));
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.recorded.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        if matches!(request.body, RequestBody::Multipart(_)) {
            if let Some(sink) = &request.upload_progress {
                for &(loaded, total) in &self.progress {
                    sink(ProgressEvent { loaded, total });
                }
            }
        }
        self.recorded.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body: request.body,
            timeout: request.timeout,
        });
        self.outcomes.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(TransportResponse { status: StatusCode::OK, headers: HeaderMap::new(), body: b"null".to_vec() })
        })
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        base_url: "http://api.test/api".to_owned(),
        timeout: Duration::from_millis(10_000),
        mode: RunMode::Development,
        with_credentials: true,
    }
}

pub fn test_client(transport: &Arc<FakeTransport>, session: &SessionStore) -> ApiClient {
    ApiClient::with_transport(test_config(), session.clone(), transport.clone())
}
