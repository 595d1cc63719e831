//! bazaar-core - Core types for the bazaar API client.
//!
//! Transport-independent pieces of the request layer: the error taxonomy and
//! classifier, the backoff policy, session model and store contract, and the
//! single-flight [`RefreshCoordinator`].

pub mod backoff;
pub mod classify;
pub mod credentials;
pub mod error;
pub mod refresh;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use backoff::{BackoffPolicy, RetryAttempt};
pub use classify::{ErrorKind, Outcome, classify};
pub use credentials::Credentials;
pub use error::Error;
pub use refresh::RefreshCoordinator;
pub use session::{MemoryStore, Session, UserSummary};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{
    Navigator, Reporter, SessionKey, SessionStore, TokenRefresher, TracingNavigator,
    TracingReporter,
};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
