use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::bot;
use crate::config::Config;
use crate::scheduler;

pub async fn run(config_path: Option<&Path>, once: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
    .context("Invalid configuration")?;
    debug!(calendar = %config.calendar_url, interval = %config.run_interval, "Configuration loaded");

    let mut bot = bot::build(&config)?;

    if once {
        // A calendar failure is already logged; it is not a process failure.
        match bot.run().await {
            Ok(report) => println!("{}", report.summary()),
            Err(e) => error!(error = %e, "Run aborted, nothing was changed"),
        }
        return Ok(());
    }

    scheduler::run_forever(&mut bot, config.interval()).await
}
