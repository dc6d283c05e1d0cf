//! Wiring of the reconciler from a validated configuration.

use eventsbot_core::history::FileHistory;
use eventsbot_core::sync::Reconciler;
use eventsbot_discord::DiscordGuild;

use crate::config::Config;
use crate::feed::IcsFeed;

pub type Bot = Reconciler<DiscordGuild, IcsFeed, FileHistory>;

pub fn build(config: &Config) -> anyhow::Result<Bot> {
    let guild = DiscordGuild::new(
        config.discord.token.clone(),
        &config.discord.bot_url,
        config.discord.server_id.clone(),
    )?;
    let feed = IcsFeed::new(config.calendar_url.clone())?;
    let history = FileHistory::open(&config.history_path)?;

    Ok(Reconciler::new(guild, feed, history)
        .with_announcement(config.discord.message.clone())
        .with_default_location(config.default_location.clone()))
}
