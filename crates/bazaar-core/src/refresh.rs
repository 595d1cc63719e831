//! Single-flight access token renewal.
//!
//! Many requests can see their access token rejected at about the same time.
//! The [`RefreshCoordinator`] lets exactly one of them (the owner) call the
//! refresh endpoint; every other caller queues a [`PendingCall`] and is
//! settled with the owner's result.
//!
//! ```text
//!            auth expired                 refresh ok: store tokens, resolve queue
//!   Idle ──────────────────▶ Refreshing ─────────────────────────────────────▶ Idle
//!                             │  ▲     refresh failed: clear session, reject
//!               auth expired  └──┘     queue, navigate to login once
//!               (enqueue)
//! ```

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::error::{AuthError, Error};
use crate::session::Session;
use crate::tokens::{AccessToken, RefreshToken};
use crate::traits::{Navigator, SessionKey, SessionStore, TokenRefresher};

/// A caller suspended on the refresh currently in flight.
struct PendingCall {
    tx: oneshot::Sender<std::result::Result<AccessToken, AuthError>>,
}

impl PendingCall {
    fn resolve(self, token: AccessToken) {
        // The receiver is gone if the waiting request was dropped.
        let _ = self.tx.send(Ok(token));
    }

    fn reject(self, error: AuthError) {
        let _ = self.tx.send(Err(error));
    }
}

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<PendingCall> },
}

/// What a caller does after joining the state machine.
enum Role {
    /// A renewed token is already stored; replay with it.
    Ready(AccessToken),
    /// Perform the refresh and settle the queue.
    Owner,
    /// Wait for the owner.
    Waiter(oneshot::Receiver<std::result::Result<AccessToken, AuthError>>),
}

/// Why a refresh is being requested.
#[derive(Clone, Copy)]
enum Trigger<'a> {
    /// The server rejected a request sent with this token.
    Rejected(Option<&'a AccessToken>),
    /// An explicit refresh, whatever the current token.
    Forced,
}

/// Owns the single in-flight refresh and the queue of callers waiting on it.
///
/// One coordinator exists per client. The session store is written only when
/// a refresh cycle settles, by the cycle's owner.
pub struct RefreshCoordinator {
    store: Arc<dyn SessionStore>,
    refresher: Arc<dyn TokenRefresher>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        refresher: Arc<dyn TokenRefresher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            refresher,
            navigator,
            state: Mutex::new(RefreshState::Idle),
        }
    }

    /// True while a refresh cycle is outstanding.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock_state(), RefreshState::Refreshing { .. })
    }

    /// Number of callers queued behind the current refresh.
    pub fn pending(&self) -> usize {
        match &*self.lock_state() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Obtain a renewed access token after a request sent with `stale` was
    /// rejected.
    ///
    /// Joins the refresh in flight if there is one, otherwise starts one.
    /// If the stored token already differs from `stale`, another caller
    /// renewed the session in the meantime and that token is returned
    /// without a network call.
    #[instrument(skip_all)]
    pub async fn renew(&self, stale: Option<&AccessToken>) -> Result<AccessToken> {
        let role = self.join(Trigger::Rejected(stale))?;
        self.complete(role).await
    }

    /// Refresh the session now, sharing any cycle already in flight.
    #[instrument(skip_all)]
    pub async fn refresh_now(&self) -> Result<AccessToken> {
        let role = self.join(Trigger::Forced)?;
        self.complete(role).await
    }

    fn join(&self, trigger: Trigger<'_>) -> std::result::Result<Role, AuthError> {
        let mut state = self.lock_state();

        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(PendingCall { tx });
            debug!(queued = waiters.len(), "Refresh in flight, queueing caller");
            return Ok(Role::Waiter(rx));
        }

        if let Trigger::Rejected(stale) = trigger {
            let current = self.store.get(SessionKey::AccessToken).map(AccessToken::new);
            if current.as_ref() != stale {
                return match current {
                    Some(token) => {
                        debug!("Session already renewed, replaying with stored token");
                        Ok(Role::Ready(token))
                    }
                    None => Err(AuthError::SessionCleared),
                };
            }
        }

        *state = RefreshState::Refreshing {
            waiters: Vec::new(),
        };
        Ok(Role::Owner)
    }

    async fn complete(&self, role: Role) -> Result<AccessToken> {
        match role {
            Role::Ready(token) => Ok(token),
            Role::Waiter(rx) => match rx.await {
                Ok(result) => result.map_err(Error::from),
                Err(_) => Err(AuthError::RefreshAbandoned.into()),
            },
            Role::Owner => {
                let cycle = Cycle {
                    coordinator: self,
                    settled: false,
                };
                let outcome = self.call_refresher().await;
                cycle.settle(outcome)
            }
        }
    }

    async fn call_refresher(&self) -> std::result::Result<crate::TokenPair, AuthError> {
        let refresh_token = self
            .store
            .get(SessionKey::RefreshToken)
            .map(RefreshToken::new)
            .ok_or(AuthError::RefreshTokenMissing)?;

        info!("Refreshing session");
        self.refresher
            .refresh(&refresh_token)
            .await
            .map_err(|e| AuthError::from_refresh_error(&e))
    }

    fn take_waiters(&self) -> Vec<PendingCall> {
        let mut state = self.lock_state();
        match mem::replace(&mut *state, RefreshState::Idle) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => Vec::new(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("pending", &self.pending())
            .finish()
    }
}

/// The owner's hold on a refresh cycle.
///
/// Dropping it unsettled (the owner's future was cancelled) rejects the
/// queue and returns the coordinator to `Idle`.
struct Cycle<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl Cycle<'_> {
    fn settle(
        mut self,
        outcome: std::result::Result<crate::TokenPair, AuthError>,
    ) -> Result<AccessToken> {
        self.settled = true;
        let coordinator = self.coordinator;

        match outcome {
            Ok(tokens) => {
                Session::save_tokens(coordinator.store.as_ref(), &tokens);
                let waiters = coordinator.take_waiters();
                debug!(waiters = waiters.len(), "Session refreshed");
                for waiter in waiters {
                    waiter.resolve(tokens.access_token.clone());
                }
                Ok(tokens.access_token)
            }
            Err(error) => {
                warn!(error = %error, "Session refresh failed, clearing session");
                coordinator.store.clear();
                let waiters = coordinator.take_waiters();
                for waiter in waiters {
                    waiter.reject(error.clone());
                }
                coordinator.navigator.navigate_to_login();
                Err(error.into())
            }
        }
    }
}

impl Drop for Cycle<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let waiters = self.coordinator.take_waiters();
        warn!(
            waiters = waiters.len(),
            "Refresh owner dropped before settling"
        );
        for waiter in waiters {
            waiter.reject(AuthError::RefreshAbandoned);
        }
    }
}
