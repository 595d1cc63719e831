//! Terminal implementations of the reporter and navigator.

use tracing::debug;

use bazaar_core::{Error, Navigator, Reporter};

use crate::output;

/// Prints a short, user-facing message for every failed request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, error: &Error) {
        debug!(error = %error, "Reporting failed request");
        output::error(error.user_message());
    }
}

/// Tells the user to sign in again once the session is gone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate_to_login(&self) {
        output::notice("Your session has expired. Run 'bazaar login' to sign in again.");
    }
}
