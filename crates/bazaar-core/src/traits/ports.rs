//! Host-facing side effects: error notification and forced navigation.

use tracing::{info, warn};

use crate::error::Error;

/// Surfaces terminal request errors to the user.
///
/// Fire-and-forget: implementations must not panic and cannot fail.
pub trait Reporter: Send + Sync {
    fn report(&self, error: &Error);
}

/// Sends the user to the login screen after the session is lost.
pub trait Navigator: Send + Sync {
    fn navigate_to_login(&self);
}

/// Reporter that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, error: &Error) {
        match error.kind() {
            Some(kind) => warn!(%kind, error = %error, "{}", error.user_message()),
            None => warn!(error = %error, "{}", error.user_message()),
        }
    }
}

/// Navigator that logs the redirect instead of performing one.
#[derive(Debug, Clone)]
pub struct TracingNavigator {
    login_route: String,
}

impl TracingNavigator {
    pub fn new(login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
        }
    }
}

impl Default for TracingNavigator {
    fn default() -> Self {
        Self::new("/login")
    }
}

impl Navigator for TracingNavigator {
    fn navigate_to_login(&self) {
        info!(route = %self.login_route, "Session lost, navigating to login");
    }
}
