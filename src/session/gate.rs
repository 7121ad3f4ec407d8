use std::sync::Arc;

use log::{info, warn};

use crate::api::{ADMIN_USERNAME, ConsoleApi};
use crate::error::ConsoleResult;

use super::{SessionHandle, SessionMode, forms};

/// Drives the session transitions that need the backend.
#[derive(Clone)]
pub struct SessionGate {
    api: Arc<dyn ConsoleApi>,
    session: SessionHandle,
}

impl SessionGate {
    pub fn new(api: Arc<dyn ConsoleApi>, session: SessionHandle) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Startup checks. The session check only runs once the password check
    /// reported a configured password.
    pub async fn resolve(&self) -> SessionMode {
        let configured = match self.api.is_admin_password_set().await {
            Ok(configured) => configured,
            Err(err) => {
                warn!("Admin password check failed, assuming it is unset: {err}");
                false
            }
        };
        let authenticated = if configured {
            match self.api.check_session().await {
                Ok(valid) => valid,
                Err(err) => {
                    warn!("Session check failed: {err}");
                    false
                }
            }
        } else {
            false
        };
        self.session.resolve(configured, authenticated);
        self.session.mode()
    }

    pub async fn set_admin_password(&self, password: &str, confirm: &str) -> ConsoleResult<()> {
        forms::validate_admin_password(password, confirm)?;
        self.api.set_admin_password(password).await?;
        self.session.mark_admin_password_set();
        Ok(())
    }

    pub async fn login(&self, password: &str) -> ConsoleResult<()> {
        forms::validate_login(password)?;
        self.api.login(ADMIN_USERNAME, password).await?;
        self.session.mark_logged_in();
        Ok(())
    }

    /// Always ends signed out, even if the backend call fails.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            warn!("Logout request failed: {err}");
        }
        self.session.revoke();
    }

    pub async fn change_password(&self, current: &str, new: &str, repeat: &str) -> ConsoleResult<()> {
        forms::validate_password_change(current, new, repeat)?;
        if let Err(err) = self.api.change_password(current, new).await {
            self.session.observe(&err);
            return Err(err);
        }
        info!("Admin password updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::error::ConsoleError;

    fn gate(api: &Arc<MockApi>) -> SessionGate {
        SessionGate::new(api.clone(), SessionHandle::new())
    }

    #[tokio::test]
    async fn unset_password_skips_session_check() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(false);
        let gate = gate(&api);
        assert_eq!(gate.resolve().await, SessionMode::NoAdminPassword);
        assert_eq!(api.calls(), vec!["is_admin_password_set"]);
    }

    #[tokio::test]
    async fn checks_run_in_sequence() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(true);
        api.session.ok(true);
        let gate = gate(&api);
        assert_eq!(gate.resolve().await, SessionMode::Authenticated);
        assert_eq!(api.calls(), vec!["is_admin_password_set", "check_session"]);
    }

    #[tokio::test]
    async fn rejected_session_is_signed_out() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(true);
        api.session.ok(false);
        assert_eq!(gate(&api).resolve().await, SessionMode::Unauthenticated);
    }

    #[tokio::test]
    async fn failed_checks_fall_back() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set
            .err(ConsoleError::Transport(String::from("connection refused")));
        assert_eq!(gate(&api).resolve().await, SessionMode::NoAdminPassword);

        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(true);
        api.session
            .err(ConsoleError::Transport(String::from("timeout")));
        assert_eq!(gate(&api).resolve().await, SessionMode::Unauthenticated);
    }

    #[tokio::test]
    async fn setup_then_login_reaches_signed_in() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(false);
        api.set_password.ok(());
        api.login.ok(());
        let gate = gate(&api);
        gate.resolve().await;
        gate.set_admin_password("secret1", "secret1").await.unwrap();
        assert_eq!(gate.session().mode(), SessionMode::Unauthenticated);
        gate.login("secret1").await.unwrap();
        assert_eq!(gate.session().mode(), SessionMode::Authenticated);
        assert!(api.calls().contains(&String::from("login:admin")));
    }

    #[tokio::test]
    async fn invalid_forms_never_call_the_backend() {
        let api = Arc::new(MockApi::new());
        let gate = gate(&api);
        let err = gate.set_admin_password("abc", "abd").await.unwrap_err();
        assert_eq!(err, ConsoleError::validation("Passwords do not match."));
        assert!(gate.login("").await.is_err());
        assert!(gate.change_password("a", "b", "c").await.is_err());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_login_stays_signed_out() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(true);
        api.session.ok(false);
        api.login.err(ConsoleError::Server {
            status: 401,
            message: String::from("Invalid credentials"),
        });
        let gate = gate(&api);
        gate.resolve().await;
        let err = gate.login("wrong").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(gate.session().mode(), SessionMode::Unauthenticated);
    }

    #[tokio::test]
    async fn logout_failure_still_signs_out() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(true);
        api.session.ok(true);
        api.logout
            .err(ConsoleError::Transport(String::from("offline")));
        let gate = gate(&api);
        gate.resolve().await;
        gate.logout().await;
        assert_eq!(gate.session().mode(), SessionMode::Unauthenticated);
    }

    #[tokio::test]
    async fn forbidden_password_change_revokes() {
        let api = Arc::new(MockApi::new());
        api.admin_password_set.ok(true);
        api.session.ok(true);
        api.change_password
            .err(ConsoleError::Authorization(String::from("denied")));
        let gate = gate(&api);
        gate.resolve().await;
        assert!(gate.change_password("old", "new1", "new1").await.is_err());
        assert_eq!(gate.session().mode(), SessionMode::Unauthenticated);
    }
}
