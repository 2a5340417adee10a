//! Terminal rendering of the flows' output.

use std::io::{self, IsTerminal, Stdout, Write};

use postboard_core::models::{Post, UserRecord};
use postboard_core::surface::{Form, Notice, Page, PostsView, Severity, Surface};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Writes notices, posts and profiles as plain text.
///
/// Navigation requests are held until the caller takes them with
/// [`TerminalSurface::take_navigation`]; the terminal has no pages of its own.
pub struct TerminalSurface<W: Write = Stdout> {
    out: W,
    show_progress: bool,
    navigation: Option<Page>,
}

impl TerminalSurface {
    /// Surface on stdout. Progress goes to stderr, and only when it is a tty.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), io::stderr().is_terminal())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, show_progress: bool) -> Self {
        Self {
            out,
            show_progress,
            navigation: None,
        }
    }

    /// Returns the most recent navigation request, if any, and forgets it.
    pub fn take_navigation(&mut self) -> Option<Page> {
        self.navigation.take()
    }

    /// Writes a line outside of any flow (hints, help).
    pub fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    /// Writes `text` without a newline and flushes, for input prompts.
    pub fn prompt(&mut self, text: &str) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_post(&mut self, post: &Post) {
        let _ = writeln!(self.out, "{}", post.title);
        let _ = writeln!(
            self.out,
            "  by {} on {}",
            post.author_name,
            post.created_at.format(TIMESTAMP_FORMAT)
        );
        for line in post.content.lines() {
            let _ = writeln!(self.out, "  {line}");
        }
        let _ = writeln!(self.out);
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "✓",
        Severity::Warning => "!",
        Severity::Error => "✗",
        Severity::Info => "i",
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn notify(&mut self, notice: Notice) {
        let _ = writeln!(self.out, "{} {}", marker(notice.severity), notice.message);
    }

    fn set_loading(&mut self, loading: bool) {
        if !self.show_progress {
            return;
        }
        let mut err = io::stderr();
        if loading {
            let _ = write!(err, "…");
        } else {
            let _ = write!(err, "\r \r");
        }
        let _ = err.flush();
    }

    fn render_posts(&mut self, view: PostsView) {
        match view {
            PostsView::Items(posts) => {
                for post in &posts {
                    self.write_post(post);
                }
            }
            PostsView::Empty => self.line("No posts yet. Be the first to write one."),
            PostsView::Unavailable => self.line("Posts are unavailable right now."),
            PostsView::Offline => self.line("Posts could not be loaded."),
        }
    }

    fn render_profile(&mut self, user: &UserRecord) {
        let _ = writeln!(self.out, "Name:          {}", user.name);
        let _ = writeln!(self.out, "Email:         {}", user.email);
        let _ = writeln!(self.out, "User ID:       {}", user.id);
        let _ = writeln!(
            self.out,
            "Member since:  {}",
            user.created_at.format(TIMESTAMP_FORMAT)
        );
    }

    fn navigate_to(&mut self, page: Page) {
        tracing::debug!(%page, "navigation requested");
        self.navigation = Some(page);
    }

    fn clear_form(&mut self, form: Form) {
        // Forms are command arguments or prompted lines; nothing is retained.
        tracing::debug!(?form, "form cleared");
    }
}
