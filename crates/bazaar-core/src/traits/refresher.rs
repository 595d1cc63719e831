//! Token refresh trait.

use async_trait::async_trait;

use crate::Result;
use crate::tokens::{RefreshToken, TokenPair};

/// Exchanges a refresh token for a new token pair.
///
/// Injected into [`RefreshCoordinator`](crate::RefreshCoordinator); the
/// HTTP implementation calls the identity service's refresh endpoint.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair>;
}
