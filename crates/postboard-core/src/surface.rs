//! The narrow interface between the flows and whatever presents them.
//!
//! The core never formats anything for display; it only reports what should
//! be shown. Every method is infallible: writing to a surface the user has
//! already left must be silently ignored by the implementation.

use std::fmt;
use std::str::FromStr;

use crate::models::{Post, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

/// Navigable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Login / registration.
    Entry,
    Posts,
    Profile,
}

impl Page {
    /// Privileged pages run the session guard on every load.
    pub fn is_privileged(self) -> bool {
        !matches!(self, Page::Entry)
    }

    pub fn name(self) -> &'static str {
        match self {
            Page::Entry => "entry",
            Page::Posts => "posts",
            Page::Profile => "profile",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "entry" | "login" | "index" => Ok(Page::Entry),
            "posts" | "dashboard" => Ok(Page::Posts),
            "profile" => Ok(Page::Profile),
            other => Err(format!("Unknown page: {other}")),
        }
    }
}

/// Input forms a flow may reset after success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Register,
    NewPost,
}

/// What the posts area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostsView {
    Items(Vec<Post>),
    /// The service has no posts yet. Not an error.
    Empty,
    /// The service refused the listing.
    Unavailable,
    /// The service could not be reached.
    Offline,
}

impl PostsView {
    pub fn from_posts(posts: Vec<Post>) -> Self {
        if posts.is_empty() {
            PostsView::Empty
        } else {
            PostsView::Items(posts)
        }
    }
}

/// Rendering surface the flows write to.
pub trait Surface {
    fn notify(&mut self, notice: Notice);
    fn set_loading(&mut self, loading: bool);
    fn render_posts(&mut self, view: PostsView);
    fn render_profile(&mut self, user: &UserRecord);
    fn navigate_to(&mut self, page: Page);
    fn clear_form(&mut self, form: Form);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn notify(&mut self, notice: Notice) {
        (**self).notify(notice);
    }

    fn set_loading(&mut self, loading: bool) {
        (**self).set_loading(loading);
    }

    fn render_posts(&mut self, view: PostsView) {
        (**self).render_posts(view);
    }

    fn render_profile(&mut self, user: &UserRecord) {
        (**self).render_profile(user);
    }

    fn navigate_to(&mut self, page: Page) {
        (**self).navigate_to(page);
    }

    fn clear_form(&mut self, form: Form) {
        (**self).clear_form(form);
    }
}

/// Tracks the notice currently on screen. A new notice replaces the old one.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    current: Option<Notice>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `notice` the visible message and forwards it to `surface`.
    pub fn show(&mut self, surface: &mut impl Surface, notice: Notice) {
        match notice.severity {
            Severity::Error | Severity::Warning => {
                tracing::info!(severity = ?notice.severity, message = %notice.message, "notice");
            }
            Severity::Info | Severity::Success => {
                tracing::debug!(severity = ?notice.severity, message = %notice.message, "notice");
            }
        }
        self.current = Some(notice.clone());
        surface.notify(notice);
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}
