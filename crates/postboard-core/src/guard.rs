//! Per-page-load session check.
//!
//! `Unchecked -> Verifying -> {Authorized, Rejected}`. The cached flag only
//! decides whether the round trip is worth making; authorization always comes
//! from the server. A guard runs once: [`SessionGuard::run`] consumes it, and
//! the next page load builds a new one.

use crate::api::{ApiOutcome, ContentService};
use crate::flows::{App, messages};
use crate::models::UserRecord;
use crate::session::SessionStore;
use crate::surface::{Notice, Page, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Unchecked,
    Verifying,
    Authorized(UserRecord),
    Rejected(Rejection),
}

impl GuardState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardState::Authorized(_))
    }

    fn name(&self) -> &'static str {
        match self {
            GuardState::Unchecked => "unchecked",
            GuardState::Verifying => "verifying",
            GuardState::Authorized(_) => "authorized",
            GuardState::Rejected(_) => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The cache holds no session; no request was made.
    NotLoggedIn,
    /// The server rejected the credential.
    SessionInvalid,
    /// The server refused the profile for another reason.
    Refused(String),
    /// The server could not be reached. The cache is left alone since the
    /// real session state is unknown.
    Offline(String),
}

impl Rejection {
    /// Whether this rejection sends the user to the entry page.
    pub fn redirects(&self) -> bool {
        !matches!(self, Rejection::Offline(_))
    }
}

#[derive(Debug)]
pub struct SessionGuard {
    state: GuardState,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Unchecked,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    fn transition(&mut self, next: GuardState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "session guard");
        self.state = next;
    }

    /// Decides whether the current page may be shown, then applies the
    /// consequences: cache refresh or clear, notices, navigation.
    pub async fn run<A, S, U>(mut self, app: &mut App<A, S, U>) -> GuardState
    where
        A: ContentService,
        S: SessionStore,
        U: Surface,
    {
        if !app.cache.get().logged_in {
            self.transition(GuardState::Rejected(Rejection::NotLoggedIn));
        } else {
            self.transition(GuardState::Verifying);

            app.surface.set_loading(true);
            let outcome = app.api.fetch_profile().await;
            app.surface.set_loading(false);

            let next = match outcome {
                ApiOutcome::Ok(user) => GuardState::Authorized(user),
                ApiOutcome::SessionInvalid => GuardState::Rejected(Rejection::SessionInvalid),
                ApiOutcome::DomainError(message) => {
                    GuardState::Rejected(Rejection::Refused(message))
                }
                ApiOutcome::TransportFailure(detail) => {
                    GuardState::Rejected(Rejection::Offline(detail))
                }
            };
            self.transition(next);
        }

        apply(&self.state, app);
        self.state
    }
}

fn apply<A, S, U>(state: &GuardState, app: &mut App<A, S, U>)
where
    A: ContentService,
    S: SessionStore,
    U: Surface,
{
    match state {
        GuardState::Authorized(user) => {
            if let Err(e) = app.cache.set_logged_in(user) {
                tracing::warn!(error = %e, "failed to refresh cached user");
            }
        }
        GuardState::Rejected(Rejection::NotLoggedIn) => {
            app.notify(Notice::info(messages::LOGIN_REQUIRED));
            app.surface.navigate_to(Page::Entry);
        }
        GuardState::Rejected(Rejection::SessionInvalid | Rejection::Refused(_)) => {
            tracing::info!("cached session rejected by server");
            app.forget_session();
            app.notify(Notice::warning(messages::SESSION_EXPIRED));
            app.surface.navigate_to(Page::Entry);
        }
        GuardState::Rejected(Rejection::Offline(detail)) => {
            tracing::warn!(%detail, "could not verify session");
            app.notify(Notice::error(messages::SESSION_UNVERIFIED));
        }
        GuardState::Unchecked | GuardState::Verifying => {}
    }
}

impl<A, S, U> App<A, S, U>
where
    A: ContentService,
    S: SessionStore,
    U: Surface,
{
    /// Runs a fresh session guard. Call once per privileged page load.
    pub async fn verify_session(&mut self) -> GuardState {
        SessionGuard::new().run(self).await
    }

    /// Loads `page`: privileged pages are guarded, then populated.
    ///
    /// Returns the guard's verdict, or None for the entry page.
    pub async fn open_page(&mut self, page: Page) -> Option<GuardState> {
        if !page.is_privileged() {
            return None;
        }

        let state = self.verify_session().await;
        if state.is_authorized() {
            match page {
                Page::Posts => {
                    self.list_posts().await;
                }
                Page::Profile => {
                    self.load_profile().await;
                }
                Page::Entry => {}
            }
        }
        Some(state)
    }
}
