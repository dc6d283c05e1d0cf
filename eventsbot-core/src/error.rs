//! Error types for eventsbot.

use thiserror::Error;

/// Errors that can occur in eventsbot operations.
#[derive(Error, Debug)]
pub enum EventsBotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to load calendar {url}: {reason}")]
    CalendarFetch { url: String, reason: String },

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Platform request timed out after {0}s")]
    PlatformTimeout(u64),

    #[error("Rate limited by platform after {0} retries")]
    RateLimited(u32),

    #[error("Channel '{0}' not found")]
    ChannelNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for eventsbot operations.
pub type EventsBotResult<T> = Result<T, EventsBotError>;
