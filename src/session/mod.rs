//! Session state shared by every screen.
//!
//! The console never stores credentials itself. The backend keeps the
//! session in a cookie; this module only tracks what the console has learned
//! about it and lets the rest of the app react to changes.

pub mod forms;
pub mod gate;
pub mod routes;

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use crate::error::ConsoleError;

pub use gate::SessionGate;
pub use routes::{Route, RouteDecision, View};

/// What the console currently knows about the backend session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub admin_password_configured: bool,
    pub authenticated: bool,
    /// False until the startup checks have finished.
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Loading,
    NoAdminPassword,
    Unauthenticated,
    Authenticated,
}

impl SessionState {
    pub fn mode(&self) -> SessionMode {
        if !self.resolved {
            SessionMode::Loading
        } else if !self.admin_password_configured {
            SessionMode::NoAdminPassword
        } else if self.authenticated {
            SessionMode::Authenticated
        } else {
            SessionMode::Unauthenticated
        }
    }
}

impl SessionMode {
    pub fn label(&self) -> &'static str {
        match self {
            SessionMode::Loading => "Loading",
            SessionMode::NoAdminPassword => "Setup",
            SessionMode::Unauthenticated => "Signed out",
            SessionMode::Authenticated => "Signed in",
        }
    }
}

/// Cloneable handle to the session state.
///
/// All clones share one `watch` channel, so every state machine holding a
/// handle sees transitions made by any other.
#[derive(Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn state(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub fn mode(&self) -> SessionMode {
        self.state().mode()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Records the outcome of the startup checks.
    pub fn resolve(&self, admin_password_configured: bool, authenticated: bool) {
        self.tx.send_modify(|state| {
            state.resolved = true;
            state.admin_password_configured = state.admin_password_configured || admin_password_configured;
            state.authenticated = state.admin_password_configured && authenticated;
        });
        info!("Session resolved: {:?}", self.mode());
    }

    pub fn mark_admin_password_set(&self) {
        self.tx.send_modify(|state| {
            state.resolved = true;
            state.admin_password_configured = true;
        });
        info!("Admin password configured");
    }

    pub fn mark_logged_in(&self) {
        self.tx.send_modify(|state| {
            state.resolved = true;
            state.admin_password_configured = true;
            state.authenticated = true;
        });
        info!("Logged in");
    }

    /// Drops the authenticated flag. Returns whether anything changed.
    pub fn revoke(&self) -> bool {
        let changed = self.tx.send_if_modified(|state| {
            if state.authenticated {
                state.authenticated = false;
                true
            } else {
                false
            }
        });
        if changed {
            info!("Session revoked");
        }
        changed
    }

    /// Revokes the session when `err` is an authorization failure.
    /// Returns true when the error was consumed this way.
    pub fn observe(&self, err: &ConsoleError) -> bool {
        if err.is_authorization() {
            self.revoke();
            true
        } else {
            false
        }
    }
}
