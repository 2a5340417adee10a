//! Login, registration and logout.

use super::{App, FlowOutcome, messages, pause};
use crate::api::{ApiOutcome, ContentService};
use crate::models::{LoginRequest, RegisterRequest};
use crate::session::SessionStore;
use crate::surface::{Form, Notice, Page, Surface};

impl<A, S, U> App<A, S, U>
where
    A: ContentService,
    S: SessionStore,
    U: Surface,
{
    /// Logs in and, on success, caches the user and moves to the posts page.
    ///
    /// A refused login leaves the cache exactly as it was.
    pub async fn login(&mut self, email: &str, password: &str) -> FlowOutcome {
        let request = match LoginRequest::new(email, password) {
            Ok(request) => request,
            Err(e) => return self.refuse_input(e),
        };

        self.surface.set_loading(true);
        let outcome = self.api.login(&request).await;
        self.surface.set_loading(false);

        match outcome {
            ApiOutcome::Ok(user) => {
                if let Err(e) = self.cache.set_logged_in(&user) {
                    tracing::error!(error = %e, "failed to persist session");
                    self.notify(Notice::error(messages::SESSION_NOT_SAVED));
                    return FlowOutcome::Failed(e.to_string());
                }
                tracing::info!(user = %user.id, "logged in");
                self.notify(Notice::success(messages::LOGIN_SUCCESS));
                pause(self.timings.login_redirect).await;
                self.surface.navigate_to(Page::Posts);
                FlowOutcome::Completed
            }
            ApiOutcome::DomainError(message) => {
                self.notify(Notice::error(message.clone()));
                FlowOutcome::Rejected(message)
            }
            // Login carries no session, so the client never reports this;
            // treat it as a plain refusal.
            ApiOutcome::SessionInvalid => {
                self.notify(Notice::error(messages::LOGIN_FAILED));
                FlowOutcome::Rejected(messages::LOGIN_FAILED.to_string())
            }
            ApiOutcome::TransportFailure(detail) => self.connectivity_failure(&detail),
        }
    }

    /// Creates an account. The user still has to log in afterwards.
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> FlowOutcome {
        let request = match RegisterRequest::new(name, email, password) {
            Ok(request) => request,
            Err(e) => return self.refuse_input(e),
        };

        self.surface.set_loading(true);
        let outcome = self.api.register(&request).await;
        self.surface.set_loading(false);

        match outcome {
            ApiOutcome::Ok(message) => {
                tracing::info!(email = request.email(), "registered");
                self.notify(Notice::success(message));
                self.surface.clear_form(Form::Register);
                FlowOutcome::Completed
            }
            ApiOutcome::DomainError(message) => {
                self.notify(Notice::error(message.clone()));
                FlowOutcome::Rejected(message)
            }
            ApiOutcome::SessionInvalid => {
                self.notify(Notice::error(messages::REGISTER_FAILED));
                FlowOutcome::Rejected(messages::REGISTER_FAILED.to_string())
            }
            ApiOutcome::TransportFailure(detail) => self.connectivity_failure(&detail),
        }
    }

    /// Best-effort remote logout; the local session is dropped and the entry
    /// page requested whatever the server says. Safe to call repeatedly.
    pub async fn logout(&mut self) -> FlowOutcome {
        self.surface.set_loading(true);
        let outcome = self.api.logout().await;
        self.surface.set_loading(false);

        if !outcome.is_ok() {
            tracing::debug!(outcome = outcome.label(), "remote logout failed, continuing locally");
        }

        self.forget_session();
        tracing::info!("logged out");
        self.notify(Notice::info(messages::LOGGED_OUT));
        self.surface.navigate_to(Page::Entry);
        FlowOutcome::Completed
    }
}
