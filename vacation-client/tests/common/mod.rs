//! Shared helpers for integration tests against a mock backend.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use vacation_client::config::ApiSettings;
use vacation_client::models::Credentials;
use vacation_client::storage::{KeyValueStore, MemoryStore};
use vacation_client::AppContext;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "secret1";
pub const TOKEN: &str = "t1";

pub fn credentials() -> Credentials {
    Credentials::new(EMAIL, PASSWORD)
}

/// Context talking to `server`, with an in-memory session store.
pub fn context_for(server: &MockServer) -> AppContext {
    context_with_storage(server, Arc::new(MemoryStore::new()))
}

pub fn context_with_storage(server: &MockServer, storage: Arc<dyn KeyValueStore>) -> AppContext {
    AppContext::with_storage(
        &ApiSettings {
            base_url: server.uri(),
        },
        storage,
    )
    .expect("Failed to build app context")
}

pub fn user_json(id: &str, is_admin: bool) -> Value {
    json!({
        "id": id,
        "nome": "Ana Souza",
        "cargo": "Desenvolvedora",
        "isAdmin": is_admin
    })
}

pub fn vacation_json(id: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "funcionario": {
            "_id": "u1",
            "nome": "Ana Souza",
            "email": EMAIL,
            "cargo": "Desenvolvedora"
        },
        "dataInicio": "2026-07-01T00:00:00.000Z",
        "dataFim": "2026-07-15T00:00:00.000Z",
        "status": status,
        "motivo": "Viagem",
        "createdAt": "2026-06-01T12:00:00.000Z",
        "updatedAt": "2026-06-01T12:00:00.000Z"
    })
}

/// Mount a login endpoint that accepts `email`/`password` and hands out `token`.
pub async fn mount_login(server: &MockServer, email: &str, password: &str, token: &str, user: Value) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": email, "senha": password })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "user": user
        })))
        .mount(server)
        .await;
}

/// Context already logged in as a regular user with token `t1`.
pub async fn logged_in(server: &MockServer) -> AppContext {
    mount_login(server, EMAIL, PASSWORD, TOKEN, user_json("u1", false)).await;

    let context = context_for(server);
    context
        .auth
        .login(&credentials())
        .await
        .expect("Login against mock backend failed");
    context
}
