//! Collaborator traits: session persistence, token refresh, host ports.

mod ports;
mod refresher;
mod store;

pub use ports::{Navigator, Reporter, TracingNavigator, TracingReporter};
pub use refresher::TokenRefresher;
pub use store::{SessionKey, SessionStore};
