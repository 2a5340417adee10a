//! Profile command handler.

use anyhow::Result;
use postboard_core::config::{Config, Timings};

use super::{app, follow_navigation, guard};
use crate::cli::finish;

pub async fn show(config: &Config) -> Result<()> {
    let mut app = app(config, Timings::IMMEDIATE)?;
    guard(&mut app).await?;
    let outcome = app.load_profile().await;
    follow_navigation(&mut app);
    finish(outcome)
}
