//! Session verification before a protected view renders.
//!
//! A `RouteGuard` is created per navigation and walks
//! `Unknown -> Verifying -> {Valid, Invalid}`. `Valid` and `Invalid` are
//! terminal; navigating again means building a fresh guard.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::api::InventoryClient;
use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unknown,
    Verifying,
    Valid,
    Invalid,
}

impl GuardState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GuardState::Valid | GuardState::Invalid)
    }
}

/// What the view layer should show for the guarded route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Neutral placeholder while the outcome is unknown
    Loading,
    Render(Route),
    /// Send the user to login, remembering where they were headed
    Redirect { to: Route, from: Route },
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    requested: Route,
    state: GuardState,
    history: Vec<GuardState>,
}

impl RouteGuard {
    pub fn new(requested: Route) -> Self {
        Self {
            requested,
            state: GuardState::Unknown,
            history: vec![GuardState::Unknown],
        }
    }

    pub fn requested(&self) -> Route {
        self.requested
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Every state this guard has been in, oldest first
    pub fn history(&self) -> &[GuardState] {
        &self.history
    }

    pub fn decision(&self) -> GuardDecision {
        match self.state {
            GuardState::Unknown | GuardState::Verifying => GuardDecision::Loading,
            GuardState::Valid => GuardDecision::Render(self.requested),
            GuardState::Invalid => GuardDecision::Redirect {
                to: Route::Login,
                from: self.requested,
            },
        }
    }

    fn transition(&mut self, next: GuardState) {
        debug!(route = %self.requested, from = ?self.state, to = ?next, "Guard transition");
        self.state = next;
        self.history.push(next);
    }

    /// Run verification to a terminal state.
    ///
    /// Returns `None` when `cancel` fires first; the guard is then left
    /// where it was and no outcome may be applied.
    pub async fn check(
        &mut self,
        client: &InventoryClient,
        cancel: &CancellationToken,
    ) -> Option<GuardState> {
        if self.state.is_terminal() {
            return Some(self.state);
        }
        if cancel.is_cancelled() {
            return None;
        }

        if !self.requested.is_protected() {
            self.transition(GuardState::Valid);
            return Some(self.state);
        }

        // Clearly logged out: no need to ask the server
        if !client.is_authenticated() {
            self.transition(GuardState::Invalid);
            return Some(self.state);
        }

        self.transition(GuardState::Verifying);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(route = %self.requested, "Verification cancelled, discarding result");
                return None;
            }
            result = client.verify() => result,
        };

        let next = match outcome {
            Ok(true) => GuardState::Valid,
            Ok(false) => {
                Self::discard_session(client);
                GuardState::Invalid
            }
            Err(e) => {
                warn!(error = %e, "Session verification failed");
                Self::discard_session(client);
                GuardState::Invalid
            }
        };
        self.transition(next);
        Some(next)
    }

    fn discard_session(client: &InventoryClient) {
        if !client.is_authenticated() {
            return;
        }
        if let Err(e) = client.clear_session() {
            error!(error = %e, "Failed to clear rejected session");
        }
    }
}
