//! Defaults shared by the bot, the Discord facade and the CLI.

/// Channel announcements go to when none is configured.
pub const DEFAULT_CHANNEL: &str = "general";

/// Location used for calendar events without one.
pub const DEFAULT_EVENT_LOCATION: &str = "Santa Claus Village 96930 Rovaniemi, Finland";

/// Time between two reconciliation runs.
pub const DEFAULT_INTERVAL: &str = "24h";

/// Announcement text when none is configured.
pub const DEFAULT_MESSAGE: &str = "A new event was added";

/// Where the announcement history is kept.
pub const DEFAULT_HISTORY_PATH: &str = "~/.eventsbot/history";

/// Per-request timeout for every outbound HTTP call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Freshness window of the cached remote event and channel lists, in seconds.
pub const DEFAULT_LIST_TTL_SECS: i64 = 3600;

/// Prefix of invite links appended to announcements.
pub const DISCORD_SHORT_URL: &str = "https://discord.gg";

/// Prefix of the environment variables read in env mode.
pub const ENV_PREFIX: &str = "EVENTSBOT";

/// Upper bound on recurring instances expanded per master event.
pub const MAX_RECURRENCE_INSTANCES: u16 = 365;
