//! Maps session events to views.
//!
//! The request pipeline only publishes [`SessionEvent`]s; deciding where the
//! user ends up happens here, behind the [`Navigator`] seam.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::models::UserProfile;
use crate::services::SessionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Admin,
    NewVacation,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Register => "/register",
            View::Dashboard => "/dashboard",
            View::Admin => "/admin",
            View::NewVacation => "/ferias/nova",
        }
    }
}

/// Where a user lands right after logging in.
pub fn landing_view(user: &UserProfile) -> View {
    if user.is_admin {
        View::Admin
    } else {
        View::Dashboard
    }
}

pub fn view_for_event(event: &SessionEvent) -> View {
    match event {
        SessionEvent::LoggedIn { is_admin: true, .. } => View::Admin,
        SessionEvent::LoggedIn { .. } => View::Dashboard,
        SessionEvent::LoggedOut | SessionEvent::Expired { .. } => View::Login,
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, view: View, event: &SessionEvent);
}

/// Drive `navigator` from session events until the store is dropped.
pub fn spawn_navigation_listener(
    mut events: broadcast::Receiver<SessionEvent>,
    navigator: Arc<dyn Navigator>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let view = view_for_event(&event);
                    tracing::debug!(?event, view = view.path(), "Navigating");
                    navigator.navigate(view, &event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Navigation listener lagged behind session events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
