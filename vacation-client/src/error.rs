//! Closed error taxonomy of the request pipeline.
//!
//! | Outcome | Variant |
//! |---------|---------|
//! | no response (unreachable, timeout) | `Connectivity` |
//! | 401 on the login call | `Auth` |
//! | 401 on any other call | `SessionExpired` |
//! | 403 | `Permission` |
//! | 404 | `NotFound` |
//! | 500 | `Server` |
//! | any other status | `Unclassified` |

use reqwest::StatusCode;
use thiserror::Error;

use crate::services::api_client::RequestKind;
use crate::storage::StorageError;

pub const CONNECTIVITY_MESSAGE: &str = "Unable to reach the server. Check your connection.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const PERMISSION_MESSAGE: &str = "You do not have permission to perform this action";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
pub const SERVER_FALLBACK_MESSAGE: &str = "Server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity { detail: String },

    #[error("{0}")]
    Auth(String),

    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    #[error("{}", PERMISSION_MESSAGE)]
    Permission,

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{0}")]
    Server(String),

    #[error("Request failed with status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Unclassified {
        status: StatusCode,
        message: Option<String>,
        body: Option<serde_json::Value>,
    },

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),

    #[error("Session changed while the request was in flight")]
    Superseded,
}

impl ApiError {
    /// Wrap a transport failure. Every `reqwest` send error means no usable
    /// response reached us.
    pub fn connectivity(err: &reqwest::Error) -> Self {
        ApiError::Connectivity {
            detail: err.to_string(),
        }
    }

    /// HTTP status behind the error, when the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Auth(_) | ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::Permission => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound => Some(StatusCode::NOT_FOUND),
            ApiError::Server(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Unclassified { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map a non-success response to its error kind.
///
/// Pure: the forced logout that accompanies `SessionExpired` is applied by
/// the caller.
pub fn classify(status: StatusCode, body: &[u8], kind: RequestKind) -> ApiError {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    let message = parsed.as_ref().and_then(server_message);

    match status {
        StatusCode::UNAUTHORIZED => match kind {
            RequestKind::Login => {
                ApiError::Auth(message.unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_string()))
            }
            RequestKind::Standard => ApiError::SessionExpired,
        },
        StatusCode::FORBIDDEN => ApiError::Permission,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::INTERNAL_SERVER_ERROR => {
            ApiError::Server(message.unwrap_or_else(|| SERVER_FALLBACK_MESSAGE.to_string()))
        }
        _ => ApiError::Unclassified {
            status,
            message: message.or_else(|| plain_text(body, parsed.is_some())),
            body: parsed,
        },
    }
}

/// Non-JSON bodies are kept verbatim as the message.
fn plain_text(body: &[u8], is_json: bool) -> Option<String> {
    if is_json {
        return None;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn server_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_unclassified_keeps_plain_text_body() {
        let err = classify(
            StatusCode::CONFLICT,
            b"  Periodo sobreposto\n",
            RequestKind::Standard,
        );

        match &err {
            ApiError::Unclassified {
                status,
                message,
                body,
            } => {
                assert_eq!(*status, StatusCode::CONFLICT);
                assert_eq!(message.as_deref(), Some("Periodo sobreposto"));
                assert!(body.is_none());
            }
            other => panic!("Expected Unclassified error, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "Request failed with status 409 Conflict: Periodo sobreposto"
        );

        let empty = classify(StatusCode::CONFLICT, b"   ", RequestKind::Standard);
        assert!(matches!(empty, ApiError::Unclassified { message: None, .. }));
    }

    #[test]
    fn test_server_error_carries_backend_message() {
        let err = classify(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json(serde_json::json!({ "message": "DB down" })),
            RequestKind::Standard,
        );

        match err {
            ApiError::Server(msg) => assert_eq!(msg, "DB down"),
            other => panic!("Expected Server error, got {:?}", other),
        }
    }

    #[test]
    fn test_server_error_without_body_uses_fallback() {
        let err = classify(StatusCode::INTERNAL_SERVER_ERROR, b"", RequestKind::Standard);

        match err {
            ApiError::Server(msg) => assert_eq!(msg, SERVER_FALLBACK_MESSAGE),
            other => panic!("Expected Server error, got {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_on_login_is_auth_error() {
        let err = classify(
            StatusCode::UNAUTHORIZED,
            &json(serde_json::json!({ "message": "Credenciais inválidas" })),
            RequestKind::Login,
        );

        match err {
            ApiError::Auth(msg) => assert_eq!(msg, "Credenciais inválidas"),
            other => panic!("Expected Auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_on_login_without_body() {
        let err = classify(StatusCode::UNAUTHORIZED, b"", RequestKind::Login);
        assert_eq!(err.to_string(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_unauthorized_elsewhere_expires_session() {
        let err = classify(StatusCode::UNAUTHORIZED, b"", RequestKind::Standard);
        assert!(matches!(err, ApiError::SessionExpired));
    }

    #[test]
    fn test_forbidden_ignores_server_text() {
        let err = classify(
            StatusCode::FORBIDDEN,
            &json(serde_json::json!({ "message": "nope" })),
            RequestKind::Standard,
        );

        assert!(matches!(err, ApiError::Permission));
        assert_eq!(err.to_string(), PERMISSION_MESSAGE);
    }

    #[test]
    fn test_not_found() {
        let err = classify(StatusCode::NOT_FOUND, b"<html>", RequestKind::Standard);
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_other_status_passes_detail_through() {
        let body = serde_json::json!({ "message": "Período sobreposto", "field": "dataInicio" });
        let err = classify(StatusCode::BAD_REQUEST, &json(body.clone()), RequestKind::Standard);

        match err {
            ApiError::Unclassified {
                status,
                message,
                body: Some(raw),
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message.as_deref(), Some("Período sobreposto"));
                assert_eq!(raw, body);
            }
            other => panic!("Expected Unclassified error, got {:?}", other),
        }
    }

    #[test]
    fn test_other_status_with_non_json_body() {
        let err = classify(StatusCode::CONFLICT, b"conflict", RequestKind::Standard);

        match err {
            ApiError::Unclassified { message, body, .. } => {
                assert!(message.is_none());
                assert!(body.is_none());
            }
            other => panic!("Expected Unclassified error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_message_falls_back() {
        let err = classify(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json(serde_json::json!({ "message": "   " })),
            RequestKind::Standard,
        );
        assert_eq!(err.to_string(), SERVER_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_error_key_is_accepted() {
        let err = classify(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json(serde_json::json!({ "error": "Mongo timeout" })),
            RequestKind::Standard,
        );
        assert_eq!(err.to_string(), "Mongo timeout");
    }
}
