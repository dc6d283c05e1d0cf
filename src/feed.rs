//! ICS calendar feed over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use eventsbot_core::constants::DEFAULT_TIMEOUT_SECS;
use eventsbot_core::date_range::DateRange;
use eventsbot_core::error::{EventsBotError, EventsBotResult};
use eventsbot_core::event::CalendarEvent;
use eventsbot_core::ics::events_in_range;
use eventsbot_core::source::CalendarSource;
use tracing::debug;

pub struct IcsFeed {
    url: String,
    http: reqwest::Client,
}

impl IcsFeed {
    pub fn new(url: impl Into<String>) -> EventsBotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| EventsBotError::Config(e.to_string()))?;

        Ok(IcsFeed {
            url: url.into(),
            http,
        })
    }

    async fn download(&self) -> Result<String, reqwest::Error> {
        self.http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl CalendarSource for IcsFeed {
    async fn events_in(&self, range: &DateRange) -> EventsBotResult<Vec<CalendarEvent>> {
        let content = self
            .download()
            .await
            .map_err(|e| EventsBotError::CalendarFetch {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;
        debug!(url = %self.url, bytes = content.len(), "Downloaded calendar");

        events_in_range(&content, range)
    }
}
