//! Session store: the single source of truth for who is logged in.
//!
//! Token and profile are written through to durable storage on every change
//! and hydrated from it on start-up. Every wholesale change bumps an epoch;
//! commits coming back from the network are compare-and-set against the
//! epoch observed when the request was decorated, so a late response can
//! never resurrect a cleared session or clear a newer one.

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::ApiError;
use crate::models::{AuthResponse, UserProfile};
use crate::storage::KeyValueStore;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-serialized profile.
pub const USER_KEY: &str = "user";

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: String, is_admin: bool },
    LoggedOut,
    /// A non-login request was rejected with 401; the session is gone.
    Expired { path: String },
}

/// An authenticated identity, as returned by login and registration.
#[derive(Debug)]
pub struct Session {
    pub token: SecretString,
    pub user: UserProfile,
}

/// Session fields captured when a request is decorated.
#[derive(Debug)]
pub struct SessionSnapshot {
    token: Option<SecretString>,
    epoch: u64,
}

impl SessionSnapshot {
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user: Option<UserProfile>,
    epoch: u64,
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Build the store and hydrate it from `storage`.
    ///
    /// Unreadable entries are treated as absent: a corrupted profile leaves
    /// the token in place but `current_user` returns `None`.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token, starting logged out");
                None
            }
        };

        let user = match (&token, storage.get(USER_KEY)) {
            (Some(_), Ok(Some(raw))) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored user profile is corrupted, ignoring it");
                    None
                }
            },
            (Some(_), Err(e)) => {
                tracing::warn!(error = %e, "Failed to read stored user profile");
                None
            }
            _ => None,
        };

        if let Some(user) = &user {
            tracing::debug!(user_id = %user.id, "Restored session from storage");
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            storage,
            state: RwLock::new(SessionState {
                token: token.map(SecretString::new),
                user,
                epoch: 0,
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine: nothing is listening for navigation.
        let _ = self.events.send(event);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            token: state
                .token
                .as_ref()
                .map(|t| SecretString::new(t.expose_secret().clone())),
            epoch: state.epoch,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().token.is_some()
    }

    /// Cached profile. Never touches the network.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.read().user.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.state
            .read()
            .user
            .as_ref()
            .map(|u| u.is_admin)
            .unwrap_or(false)
    }

    /// Replace the session with `auth`, provided nothing changed since
    /// `issued` was taken.
    pub fn establish(
        &self,
        auth: AuthResponse,
        issued: &SessionSnapshot,
    ) -> Result<Session, ApiError> {
        let user_json = serde_json::to_string(&auth.user)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        let mut state = self.state.write();
        if state.epoch != issued.epoch {
            tracing::warn!(
                issued_epoch = issued.epoch,
                current_epoch = state.epoch,
                "Discarding login response for a superseded session"
            );
            return Err(ApiError::Superseded);
        }

        self.storage.set(TOKEN_KEY, &auth.token)?;
        if let Err(e) = self.storage.set(USER_KEY, &user_json) {
            // Storage must keep matching the session still live in memory.
            let rollback = match &state.token {
                Some(previous) => self.storage.set(TOKEN_KEY, previous.expose_secret()),
                None => self.storage.remove(TOKEN_KEY),
            };
            if let Err(cleanup) = rollback {
                tracing::error!(error = %cleanup, "Failed to roll back stored token");
            }
            return Err(e.into());
        }

        state.token = Some(SecretString::new(auth.token.clone()));
        state.user = Some(auth.user.clone());
        state.epoch += 1;
        drop(state);

        tracing::info!(
            user_id = %auth.user.id,
            is_admin = auth.user.is_admin,
            "Session established"
        );
        self.publish(SessionEvent::LoggedIn {
            user_id: auth.user.id.clone(),
            is_admin: auth.user.is_admin,
        });

        Ok(Session {
            token: SecretString::new(auth.token),
            user: auth.user,
        })
    }

    /// Log out. Idempotent; storage failures are logged, the in-memory
    /// session is cleared regardless.
    pub fn clear(&self) {
        let was_authenticated = {
            let mut state = self.state.write();
            let was_authenticated = state.token.is_some();
            self.wipe(&mut state);
            was_authenticated
        };

        if was_authenticated {
            tracing::info!("Session cleared");
            self.publish(SessionEvent::LoggedOut);
        }
    }

    /// Forced logout after a 401 on `path`.
    ///
    /// Returns `false` without touching anything when the session has moved
    /// on since `issued` (the 401 belongs to an older identity).
    pub fn expire(&self, issued: &SessionSnapshot, path: &str) -> bool {
        {
            let mut state = self.state.write();
            if state.epoch != issued.epoch {
                tracing::debug!(path = %path, "Ignoring 401 from a superseded session");
                return false;
            }
            self.wipe(&mut state);
        }

        tracing::warn!(path = %path, "Session expired, forcing logout");
        self.publish(SessionEvent::Expired {
            path: path.to_string(),
        });
        true
    }

    fn wipe(&self, state: &mut SessionState) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::error!(key = %key, error = %e, "Failed to remove session entry");
            }
        }
        state.token = None;
        state.user = None;
        state.epoch += 1;
    }
}
