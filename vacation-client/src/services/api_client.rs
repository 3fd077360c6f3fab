//! Request pipeline shared by every backend call.
//!
//! Outbound: the session is snapshotted, the bearer token (if any) and a
//! request ID are attached, then the request is sent. Inbound: every failure
//! is mapped through [`classify`] before the caller sees it; a 401 outside
//! the login call also forces logout of the snapshotted session.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiSettings;
use crate::error::{classify, ApiError};
use crate::services::session::{SessionSnapshot, SessionStore};
use client_core::observability::TracedClientExt;

/// Per-call budget, covering connect and response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether a 401 means "bad credentials" or "session gone".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Standard,
    Login,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    kind: RequestKind,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            kind: RequestKind::Standard,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Mark this as the login call: its 401 is reported as bad credentials
    /// and leaves the session alone.
    pub fn login(mut self) -> Self {
        self.kind = RequestKind::Login;
        self
    }
}

/// A successful response together with the session it was issued under.
#[derive(Debug)]
pub struct Dispatched<T> {
    pub data: T,
    pub session: SessionSnapshot,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: Arc<SessionStore>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        tracing::debug!(base_url = %settings.base_url, "API client initialized");

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Send `request` and return the raw body of a successful response.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<Dispatched<Vec<u8>>, ApiError> {
        // Snapshot before dispatch: whatever happens to the session while
        // the request is in flight, the response is judged against this.
        let snapshot = self.session.snapshot();
        let url = format!("{}{}", self.base_url, request.path);

        let mut traced = self.client.traced(request.method.clone(), &url);
        if let Some(token) = snapshot.token() {
            traced = traced.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            traced = traced.json(body);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            request_id = %traced.request_id(),
            authenticated = snapshot.token().is_some(),
            "Sending API request"
        );

        let response = traced.send().await.map_err(|e| {
            tracing::error!(
                method = %request.method,
                path = %request.path,
                timeout = e.is_timeout(),
                "Failed to reach API: {}",
                e
            );
            ApiError::connectivity(&e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::error!(path = %request.path, "Failed to read API response body: {}", e);
            ApiError::connectivity(&e)
        })?;

        if status.is_success() {
            tracing::debug!(path = %request.path, status = %status, "API response received");
            return Ok(Dispatched {
                data: body.to_vec(),
                session: snapshot,
            });
        }

        let error = classify(status, &body, request.kind);
        tracing::warn!(
            method = %request.method,
            path = %request.path,
            status = %status,
            error = %error,
            "API request failed"
        );

        if matches!(error, ApiError::SessionExpired) {
            self.session.expire(&snapshot, &request.path);
        }

        Err(error)
    }

    /// Send `request` and decode a JSON body into `T`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Dispatched<T>, ApiError> {
        let path = request.path.clone();
        let Dispatched { data, session } = self.dispatch(request).await?;

        let data = serde_json::from_slice(&data).map_err(|e| {
            tracing::error!(path = %path, "Failed to decode API response: {}", e);
            ApiError::InvalidResponse(format!("{}: {}", path, e))
        })?;

        Ok(Dispatched { data, session })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Ok(self.send(ApiRequest::get(path)).await?.data)
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        Ok(self.send(ApiRequest::post(path).json(body)).await?.data)
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let mut request = ApiRequest::patch(path);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(self.send(request).await?.data)
    }

    /// DELETE; whatever body the server returns is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(ApiRequest::delete(path)).await?;
        Ok(())
    }
}

/// Percent-encode an identifier for use as a single path segment.
pub fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
