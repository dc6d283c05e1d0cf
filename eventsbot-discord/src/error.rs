use eventsbot_core::constants::DEFAULT_TIMEOUT_SECS;
use eventsbot_core::error::EventsBotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Still rate limited after {0} retries")]
    RateLimited(u32),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DiscordError> for EventsBotError {
    fn from(err: DiscordError) -> Self {
        match err {
            DiscordError::Http(e) if e.is_timeout() => {
                EventsBotError::PlatformTimeout(DEFAULT_TIMEOUT_SECS)
            }
            DiscordError::RateLimited(retries) => EventsBotError::RateLimited(retries),
            other => EventsBotError::Platform(other.to_string()),
        }
    }
}
