//! Periodic runs until the process is told to stop.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::bot::Bot;

/// Run now, then every `every`, until SIGINT or SIGTERM.
///
/// A signal received during a run is handled once the run is over.
pub async fn run_forever(bot: &mut Bot, every: Duration) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match bot.run().await {
                    Ok(report) => info!("{}", report.summary()),
                    Err(e) => error!(error = %e, "Run aborted, nothing was changed"),
                }
                info!(seconds = every.as_secs(), "Waiting for next run");
            }
            signal = &mut shutdown => {
                info!(signal = signal?, "Received signal, exiting.");
                return Ok(());
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
}
