//! In-memory doubles for flow and guard tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use chrono::{TimeZone, Utc};

use crate::api::{ApiOutcome, ContentService};
use crate::models::{LoginRequest, NewPost, Post, RegisterRequest, UserId, UserRecord};
use crate::surface::{Form, Notice, Page, PostsView, Surface};

pub fn ada() -> UserRecord {
    UserRecord {
        id: UserId::new("1"),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}

pub fn grace() -> UserRecord {
    UserRecord {
        id: UserId::new("2"),
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    }
}

pub fn post(title: &str) -> Post {
    Post {
        title: title.to_string(),
        content: format!("{title} body text"),
        author_name: "Ada".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

/// Queue of canned outcomes for one operation.
pub struct Script<T> {
    queue: RefCell<VecDeque<ApiOutcome<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    pub fn push(&self, outcome: ApiOutcome<T>) {
        self.queue.borrow_mut().push_back(outcome);
    }

    fn next(&self, op: &str) -> ApiOutcome<T> {
        self.queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| ApiOutcome::TransportFailure(format!("no scripted {op} outcome")))
    }
}

/// Content service answering from per-operation scripts and counting calls.
#[derive(Default)]
pub struct ScriptedService {
    pub register: Script<String>,
    pub login: Script<UserRecord>,
    pub logout: Script<()>,
    pub fetch_profile: Script<UserRecord>,
    pub list_posts: Script<Vec<Post>>,
    pub create_post: Script<String>,
    calls: RefCell<HashMap<&'static str, usize>>,
    created: RefCell<Vec<NewPost>>,
}

impl ScriptedService {
    pub fn calls(&self, op: &str) -> usize {
        self.calls.borrow().get(op).copied().unwrap_or(0)
    }

    pub fn created_posts(&self) -> Vec<NewPost> {
        self.created.borrow().clone()
    }

    fn record(&self, op: &'static str) {
        *self.calls.borrow_mut().entry(op).or_default() += 1;
    }
}

impl ContentService for ScriptedService {
    async fn register(&self, _request: &RegisterRequest) -> ApiOutcome<String> {
        self.record("register");
        self.register.next("register")
    }

    async fn login(&self, _request: &LoginRequest) -> ApiOutcome<UserRecord> {
        self.record("login");
        self.login.next("login")
    }

    async fn logout(&self) -> ApiOutcome<()> {
        self.record("logout");
        self.logout.next("logout")
    }

    async fn fetch_profile(&self) -> ApiOutcome<UserRecord> {
        self.record("fetch_profile");
        self.fetch_profile.next("fetch_profile")
    }

    async fn list_posts(&self) -> ApiOutcome<Vec<Post>> {
        self.record("list_posts");
        self.list_posts.next("list_posts")
    }

    async fn create_post(&self, post: &NewPost) -> ApiOutcome<String> {
        self.record("create_post");
        self.created.borrow_mut().push(post.clone());
        self.create_post.next("create_post")
    }
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
