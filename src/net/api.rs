//! Session-aware HTTP client for the backend API.
//!
//! ARCHITECTURE
//! ============
//! Every outbound call goes through `ApiClient::request`, which runs the same
//! pipeline for all verbs and uploads:
//!
//! 1. client defaults, then caller `RequestOptions` merged on top
//! 2. `Authorization: Bearer <token>` force-set when the session holds a token
//! 3. dispatch through the `Transport` with the resolved URL and timeout
//! 4. 2xx: decode and return the body alone
//! 5. anything else: build an `ApiError`, log it in development mode, return it
//!
//! ERROR HANDLING
//! ==============
//! No retries and no local recovery. A 401 is reported like any other status;
//! deciding to log out is left to the caller.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, parse_body};
use super::progress::{ProgressCallback, ProgressSink, percent_sink};
use super::request::{FormData, RequestBody, RequestOptions};
use super::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::config::ClientConfig;
use crate::session::SessionStore;

const JSON_CONTENT_TYPE: &str = "application/json";
const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";
const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";

#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    session: SessionStore,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Build a client backed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config).map_err(|e| ApiError::from_transport(&e))?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    #[must_use]
    pub fn with_transport(config: ClientConfig, session: SessionStore, transport: Arc<dyn Transport>) -> Self {
        Self { config: Arc::new(config), session, transport }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // =========================================================================
    // VERBS
    // =========================================================================

    /// `GET endpoint`, resolving to the decoded response body.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` for any transport, status or decode failure.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, RequestBody::Empty, options, None).await
    }

    /// `POST endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` for any transport, status or decode failure.
    pub async fn post<T, B>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = json_body(body)?;
        self.request(Method::POST, endpoint, body, options, None).await
    }

    /// `PUT endpoint` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` for any transport, status or decode failure.
    pub async fn put<T, B>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = json_body(body)?;
        self.request(Method::PUT, endpoint, body, options, None).await
    }

    /// `DELETE endpoint`.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` for any transport, status or decode failure.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, RequestBody::Empty, options, None).await
    }

    /// Multipart `POST endpoint`. `on_progress` receives whole percentages as
    /// the transport streams the body.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` for any transport, status or decode failure.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: FormData,
        options: RequestOptions,
        on_progress: Option<ProgressCallback>,
    ) -> Result<T, ApiError> {
        let mut options = options;
        if !options.headers.contains_key(CONTENT_TYPE) {
            options.headers.insert(CONTENT_TYPE, HeaderValue::from_static(MULTIPART_CONTENT_TYPE));
        }
        let sink = on_progress.map(percent_sink);
        self.request(Method::POST, endpoint, RequestBody::Multipart(form), options, sink).await
    }

    // =========================================================================
    // PIPELINE
    // =========================================================================

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
        options: RequestOptions,
        upload_progress: Option<ProgressSink>,
    ) -> Result<T, ApiError> {
        let RequestOptions { headers: overrides, timeout, query } = options;

        let mut headers = default_headers(&body);
        for (name, value) in &overrides {
            headers.insert(name.clone(), value.clone());
        }
        let authorized = self.attach_token(&mut headers).inspect_err(|e| self.report(e))?;

        let url = resolve_url(&self.config.base_url, endpoint, &query).inspect_err(|e| self.report(e))?;
        let timeout = timeout.unwrap_or(self.config.timeout);

        tracing::debug!(%method, %url, authorized, "dispatching request");

        let request = TransportRequest { method, url, headers, body, timeout, upload_progress };
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from_transport(&e);
                self.report(&err);
                return Err(err);
            }
        };

        if !response.status.is_success() {
            let err = ApiError::from_status(&response);
            self.report(&err);
            return Err(err);
        }

        let value = parse_body(&response.body).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| {
            let err = ApiError::decode(&response, &e);
            self.report(&err);
            err
        })
    }

    /// Returns whether a bearer token was attached.
    fn attach_token(&self, headers: &mut HeaderMap) -> Result<bool, ApiError> {
        let Some(token) = self.session.get_token() else {
            return Ok(false);
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::invalid_request("stored session token is not a valid header value"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Ok(true)
    }

    fn report(&self, err: &ApiError) {
        if !self.config.mode.is_development() {
            return;
        }
        match &err.response {
            Some(raw) => tracing::error!(status = %raw.status, body = %raw.body, "API Error"),
            None => tracing::error!(kind = ?err.kind, error = %err.message, "API Error"),
        }
    }
}

/// `Content-Type` only accompanies a JSON body; bodiless requests omit it.
fn default_headers(body: &RequestBody) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if matches!(body, RequestBody::Json(_)) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::invalid_request(&format!("request body serialization failed: {e}")))
}

/// Absolute endpoints pass through; relative ones are joined onto `base`.
pub(crate) fn resolve_url(base: &str, endpoint: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
    let raw = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_owned()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'))
    };
    let mut url = Url::parse(&raw).map_err(|e| ApiError::invalid_request(&format!("invalid request URL {raw}: {e}")))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
