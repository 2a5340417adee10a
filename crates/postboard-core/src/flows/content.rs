//! Posts and profile.

use super::{App, FlowOutcome};
use crate::api::{ApiOutcome, ContentService};
use crate::models::NewPost;
use crate::session::SessionStore;
use crate::surface::{Form, Notice, PostsView, Surface};

impl<A, S, U> App<A, S, U>
where
    A: ContentService,
    S: SessionStore,
    U: Surface,
{
    /// Replaces the displayed posts with the server's full collection.
    pub async fn list_posts(&mut self) -> FlowOutcome {
        self.surface.set_loading(true);
        let outcome = self.api.list_posts().await;
        self.surface.set_loading(false);

        match outcome {
            ApiOutcome::Ok(posts) => {
                tracing::debug!(count = posts.len(), "posts loaded");
                self.surface.render_posts(PostsView::from_posts(posts));
                FlowOutcome::Completed
            }
            ApiOutcome::DomainError(message) => {
                self.surface.render_posts(PostsView::Unavailable);
                self.notify(Notice::error(message.clone()));
                FlowOutcome::Rejected(message)
            }
            ApiOutcome::SessionInvalid => {
                self.surface.render_posts(PostsView::Unavailable);
                self.expire_session().await
            }
            ApiOutcome::TransportFailure(detail) => {
                self.surface.render_posts(PostsView::Offline);
                self.connectivity_failure(&detail)
            }
        }
    }

    /// Publishes a post, then reloads the list from the server. Nothing is
    /// inserted locally: ordering and author name come from the server.
    pub async fn create_post(&mut self, title: &str, content: &str) -> FlowOutcome {
        let post = match NewPost::new(title, content) {
            Ok(post) => post,
            Err(e) => return self.refuse_input(e),
        };

        self.surface.set_loading(true);
        let outcome = self.api.create_post(&post).await;
        self.surface.set_loading(false);

        match outcome {
            ApiOutcome::Ok(message) => {
                tracing::info!(title = post.title(), "post created");
                self.notify(Notice::success(message));
                self.surface.clear_form(Form::NewPost);
                // The post exists whatever the refresh reports; the refresh
                // tells the user about its own problems.
                self.list_posts().await;
                FlowOutcome::Completed
            }
            ApiOutcome::DomainError(message) => {
                self.notify(Notice::error(message.clone()));
                FlowOutcome::Rejected(message)
            }
            ApiOutcome::SessionInvalid => self.expire_session().await,
            ApiOutcome::TransportFailure(detail) => self.connectivity_failure(&detail),
        }
    }

    /// Shows the profile and refreshes the cached user with it.
    pub async fn load_profile(&mut self) -> FlowOutcome {
        self.surface.set_loading(true);
        let outcome = self.api.fetch_profile().await;
        self.surface.set_loading(false);

        match outcome {
            ApiOutcome::Ok(user) => {
                self.surface.render_profile(&user);
                if let Err(e) = self.cache.set_logged_in(&user) {
                    tracing::warn!(error = %e, "failed to refresh cached user");
                }
                FlowOutcome::Completed
            }
            ApiOutcome::DomainError(message) => {
                self.notify(Notice::error(message.clone()));
                FlowOutcome::Rejected(message)
            }
            ApiOutcome::SessionInvalid => self.expire_session().await,
            ApiOutcome::TransportFailure(detail) => self.connectivity_failure(&detail),
        }
    }
}
