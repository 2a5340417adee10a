//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use postboard_core::api::{CookieJar, HttpContentService};
use postboard_core::models::UserRecord;
use postboard_core::surface::{Form, Notice, Page, PostsView, Surface};
use serde_json::{Value, json};
use wiremock::MockServer;

pub fn user_json() -> Value {
    json!({
        "userId": 7,
        "name": "Ada",
        "email": "ada@example.com",
        "createdAt": "2024-01-01T09:00:00.000Z"
    })
}

pub fn post_json(title: &str) -> Value {
    json!({
        "title": title,
        "content": format!("{title} body text"),
        "authorName": "Ada",
        "createdAt": "2024-03-01 12:00:00"
    })
}

pub fn service_for(server: &MockServer) -> HttpContentService {
    service_with(server, Arc::new(CookieJar::in_memory()), None)
}

pub fn service_with(
    server: &MockServer,
    jar: Arc<CookieJar>,
    timeout: Option<Duration>,
) -> HttpContentService {
    HttpContentService::new(&format!("{}/api", server.uri()), jar, timeout).unwrap()
}

/// Surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub notices: Vec<Notice>,
    pub loading: Vec<bool>,
    pub posts: Vec<PostsView>,
    pub profiles: Vec<UserRecord>,
    pub navigations: Vec<Page>,
    pub cleared_forms: Vec<Form>,
}

impl Surface for RecordingSurface {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading.push(loading);
    }

    fn render_posts(&mut self, view: PostsView) {
        self.posts.push(view);
    }

    fn render_profile(&mut self, user: &UserRecord) {
        self.profiles.push(user.clone());
    }

    fn navigate_to(&mut self, page: Page) {
        self.navigations.push(page);
    }

    fn clear_form(&mut self, form: Form) {
        self.cleared_forms.push(form);
    }
}
