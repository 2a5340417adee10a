//! Auth command handlers.

use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result};
use postboard_core::config::{Config, Timings};

use super::{app, follow_navigation, guard, prompt_hidden};
use crate::cli::finish;

pub async fn register(
    config: &Config,
    name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let mut app = app(config, Timings::IMMEDIATE)?;
    let outcome = app.register(name, email, &password).await;
    if outcome.is_success() {
        app.surface_mut()
            .line(&format!("Log in with `postboard login --email {}`.", email.trim()));
    }
    finish(outcome)
}

pub async fn login(config: &Config, email: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let mut app = app(config, Timings::IMMEDIATE)?;
    let outcome = app.login(email, &password).await;
    follow_navigation(&mut app);
    finish(outcome)
}

pub async fn logout(config: &Config) -> Result<()> {
    let mut app = app(config, Timings::IMMEDIATE)?;
    let outcome = app.logout().await;
    // Already on the way out; no hint needed.
    app.surface_mut().take_navigation();
    finish(outcome)
}

pub async fn status(config: &Config) -> Result<()> {
    let mut app = app(config, Timings::IMMEDIATE)?;
    let user = guard(&mut app).await?;
    app.surface_mut()
        .line(&format!("Logged in as {} <{}>", user.name, user.email));
    Ok(())
}

/// Uses the given password, else asks for it: hidden on a terminal, one
/// line of stdin otherwise.
fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return prompt_hidden("Password");
    }
    first_line(stdin.lock())
}

fn first_line(mut reader: impl BufRead) -> Result<String> {
    let mut input = String::new();
    reader
        .read_line(&mut input)
        .context("read password from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
