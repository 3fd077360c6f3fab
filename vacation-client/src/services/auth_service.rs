use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AuthResponse, Credentials, NewAccount, UserProfile};
use crate::services::api_client::{segment, ApiClient, ApiRequest, Dispatched};
use crate::services::session::{Session, SessionStore};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const USERS_PATH: &str = "/api/auth/users";

/// Account operations layered over the session store.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Authenticate and replace the current session.
    ///
    /// A 401 surfaces as [`ApiError::Auth`] and leaves any existing session
    /// untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        tracing::info!(email = %credentials.email, "Logging in");

        let request = ApiRequest::post(LOGIN_PATH)
            .json(serde_json::json!(credentials))
            .login();
        let Dispatched { data, session } = self.api.send::<AuthResponse>(request).await?;

        self.session.establish(data, &session)
    }

    /// Create an account; the new account is logged in immediately.
    pub async fn register(&self, account: &NewAccount) -> Result<Session, ApiError> {
        tracing::info!(email = %account.email, "Registering account");

        let request = ApiRequest::post(REGISTER_PATH).json(serde_json::json!(account));
        let Dispatched { data, session } = self.api.send::<AuthResponse>(request).await?;

        self.session.establish(data, &session)
    }

    /// Elevate another account to admin. Returns the target's profile; the
    /// caller's own cached profile is not modified.
    pub async fn promote(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let path = format!("/api/auth/promote/{}", segment(user_id));
        let promoted: UserProfile = self.api.patch(&path, None).await?;

        tracing::info!(target_user_id = %promoted.id, "User promoted to admin");
        Ok(promoted)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.api.get(USERS_PATH).await
    }

    /// Accounts that can still be promoted.
    pub async fn promotable_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        let users = self.list_users().await?;
        Ok(users.into_iter().filter(|u| !u.is_admin).collect())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}", USERS_PATH, segment(user_id));
        self.api.delete(&path).await?;

        tracing::info!(target_user_id = %user_id, "User deleted");
        Ok(())
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }
}
