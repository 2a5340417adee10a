//! CLI command handlers.
//!
//! Every invocation is one page load: a fresh client over the persisted
//! cookie jar and session cache.

pub mod auth;
pub mod config;
pub mod posts;
pub mod profile;
pub mod shell;

use anyhow::{Context, Result};
use postboard_core::api::HttpContentService;
use postboard_core::config::{Config, Timings};
use postboard_core::models::UserRecord;
use postboard_core::session::FileSessionStore;
use postboard_core::{App, GuardState};
use postboard_core::surface::Page;

use super::FlowFailed;
use crate::terminal::TerminalSurface;

pub type CliApp = App<HttpContentService, FileSessionStore, TerminalSurface>;

const LOGIN_HINT: &str = "Log in with `postboard login --email <email>`.";
const POSTS_HINT: &str = "Read the latest posts with `postboard posts list`.";

/// Builds the client for one invocation.
///
/// One-shot commands pass [`Timings::IMMEDIATE`]: nothing on screen changes
/// after the process exits, so there is nothing to wait for.
fn app(config: &Config, timings: Timings) -> Result<CliApp> {
    let api = HttpContentService::from_config(config)?;
    Ok(App::new(
        api,
        FileSessionStore::default_location(),
        TerminalSurface::stdout(),
        timings,
    ))
}

/// Runs the session guard for a privileged command.
async fn guard(app: &mut CliApp) -> Result<UserRecord> {
    match app.verify_session().await {
        GuardState::Authorized(user) => Ok(user),
        state => {
            follow_navigation(app);
            Err(FlowFailed(format!("{state:?}")).into())
        }
    }
}

/// Turns a pending navigation request into a hint for the next command.
fn follow_navigation(app: &mut CliApp) {
    let hint = match app.surface_mut().take_navigation() {
        Some(Page::Entry) => LOGIN_HINT,
        Some(Page::Posts) => POSTS_HINT,
        Some(Page::Profile) | None => return,
    };
    app.surface_mut().line(hint);
}

/// Reads a password from the terminal with echo turned off.
fn prompt_hidden(label: &str) -> Result<String> {
    rpassword::prompt_password(format!("{label}: ")).context("read password from terminal")
}
