//! Request correlation for outbound HTTP calls.
//!
//! Every request built through [`TracedClientExt`] carries a fresh
//! `x-request-id` so client logs can be matched against backend logs.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use uuid::Uuid;

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A request builder that injects a request ID when sent.
///
/// The ID is generated up front so callers can log it before dispatch.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
    request_id: String,
}

impl TracedRequest {
    /// Create a new traced request from a reqwest RequestBuilder.
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self {
            request,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Add JSON body to the request.
    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
            ..self
        }
    }

    /// Add bearer auth token.
    pub fn bearer_auth<T: std::fmt::Display>(self, token: T) -> Self {
        Self {
            request: self.request.bearer_auth(token),
            ..self
        }
    }

    /// Send the request with the request ID header injected.
    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.request_id) {
            headers.insert(REQUEST_ID_HEADER, value);
        }

        self.request.headers(headers).send().await
    }
}

/// Extension trait for reqwest::Client to create traced requests.
pub trait TracedClientExt {
    fn traced(&self, method: Method, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced(&self, method: Method, url: &str) -> TracedRequest {
        TracedRequest::new(self.request(method, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_request_gets_its_own_id() {
        let client = reqwest::Client::new();
        let first = client.traced(Method::GET, "http://localhost/a");
        let second = client.traced(Method::GET, "http://localhost/a");

        assert_ne!(first.request_id(), second.request_id());
        assert!(Uuid::parse_str(first.request_id()).is_ok());
    }
}
