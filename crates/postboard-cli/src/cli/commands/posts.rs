//! Posts command handlers.

use anyhow::Result;
use postboard_core::config::{Config, Timings};

use super::{app, follow_navigation, guard};
use crate::cli::finish;

pub async fn list(config: &Config) -> Result<()> {
    let mut app = app(config, Timings::IMMEDIATE)?;
    guard(&mut app).await?;
    let outcome = app.list_posts().await;
    follow_navigation(&mut app);
    finish(outcome)
}

pub async fn create(config: &Config, title: &str, content: &str) -> Result<()> {
    let mut app = app(config, Timings::IMMEDIATE)?;
    guard(&mut app).await?;
    let outcome = app.create_post(title, content).await;
    follow_navigation(&mut app);
    finish(outcome)
}
