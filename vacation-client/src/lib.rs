pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod services;
pub mod storage;

use crate::config::{ApiSettings, Settings};
use crate::services::{ApiClient, AuthService, SessionStore, VacationService};
use crate::storage::{FileStore, KeyValueStore};
use std::sync::Arc;

pub use error::ApiError;

/// Everything a front end needs, built once at start-up and passed down.
///
/// Dropping the context closes the session event channel, which ends any
/// navigation listener.
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<SessionStore>,
    pub api: Arc<ApiClient>,
    pub auth: AuthService,
    pub vacations: VacationService,
}

impl AppContext {
    /// Context backed by the on-disk session under `settings.storage.dir`.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let storage = FileStore::open(&settings.storage.dir).map_err(|e| {
            tracing::error!("Failed to open session storage: {}", e);
            anyhow::anyhow!("Session storage error: {}", e)
        })?;

        Ok(Self::with_storage(&settings.api, Arc::new(storage))?)
    }

    pub fn with_storage(
        api_settings: &ApiSettings,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, reqwest::Error> {
        let session = Arc::new(SessionStore::open(storage));
        let api = Arc::new(ApiClient::new(api_settings, session.clone())?);

        Ok(Self {
            auth: AuthService::new(api.clone(), session.clone()),
            vacations: VacationService::new(api.clone()),
            session,
            api,
        })
    }
}
