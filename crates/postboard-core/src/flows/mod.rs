//! User-triggered flows.
//!
//! A flow runs from input validation through one remote call to user
//! feedback, and handles every outcome itself: nothing propagates past a flow
//! boundary. Flows take `&mut App`, so two flows can never overlap on the same
//! client. The cache is only touched after the call's result is classified.

mod auth;
mod content;

use std::time::Duration;

use crate::api::ContentService;
use crate::config::Timings;
use crate::session::{Session, SessionStore};
use crate::surface::{Notice, Notifier, Page, Surface};
use crate::validation::ValidationError;

pub mod messages {
    //! User-facing texts shared by several flows.

    pub const LOGIN_SUCCESS: &str = "Login successful! Redirecting...";
    pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
    pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
    pub const LOGGED_OUT: &str = "You have been logged out.";
    pub const LOGIN_REQUIRED: &str = "Please log in to continue.";
    pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
    pub const SESSION_UNVERIFIED: &str =
        "Could not verify your session with the server. Reload to try again.";
    pub const CONNECTIVITY: &str =
        "Could not reach the server. Check your connection and try again.";
    pub const SESSION_NOT_SAVED: &str = "Logged in, but the session could not be saved locally.";
}

/// How a flow ended. Purely informational: the user has already been told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    /// Refused by local validation; no request was sent.
    Invalid(ValidationError),
    /// The server refused, message shown verbatim.
    Rejected(String),
    /// The session was invalid; cache cleared and entry page requested.
    SessionExpired,
    /// The server could not be reached; cache untouched.
    Offline,
    /// A local step (persisting the cache) failed.
    Failed(String),
}

impl FlowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FlowOutcome::Completed)
    }
}

/// The client: service, session cache and surface wired together.
pub struct App<A, S, U> {
    pub(crate) api: A,
    pub(crate) cache: S,
    pub(crate) surface: U,
    pub(crate) notifier: Notifier,
    pub(crate) timings: Timings,
}

impl<A, S, U> App<A, S, U>
where
    A: ContentService,
    S: SessionStore,
    U: Surface,
{
    pub fn new(api: A, cache: S, surface: U, timings: Timings) -> Self {
        Self {
            api,
            cache,
            surface,
            notifier: Notifier::new(),
            timings,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &S {
        &self.cache
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Cached session hint. Never authorizes anything on its own.
    pub fn session(&self) -> Session {
        self.cache.get()
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notifier.show(&mut self.surface, notice);
    }

    pub(crate) fn refuse_input(&mut self, error: ValidationError) -> FlowOutcome {
        tracing::debug!(field = %error.field(), "input refused locally");
        self.notify(Notice::error(error.to_string()));
        FlowOutcome::Invalid(error)
    }

    pub(crate) fn connectivity_failure(&mut self, detail: &str) -> FlowOutcome {
        tracing::warn!(%detail, "service unreachable");
        self.notify(Notice::error(messages::CONNECTIVITY));
        FlowOutcome::Offline
    }

    /// Clears the cache; a failure is logged, never surfaced as a blocker.
    pub(crate) fn forget_session(&mut self) {
        if let Err(e) = self.cache.clear() {
            tracing::warn!(error = %e, "failed to clear session cache");
        }
    }

    /// Expiry handling shared by every privileged flow: tell the user, give
    /// them a moment to read it, then drop the session and go to the entry
    /// page.
    pub(crate) async fn expire_session(&mut self) -> FlowOutcome {
        tracing::info!("session rejected by server");
        self.notify(Notice::warning(messages::SESSION_EXPIRED));
        pause(self.timings.expiry_redirect).await;
        self.forget_session();
        self.surface.navigate_to(Page::Entry);
        FlowOutcome::SessionExpired
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
