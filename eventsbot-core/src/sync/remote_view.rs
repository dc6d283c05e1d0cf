//! Cached view of the platform.
//!
//! Event and channel lists are read once and reused until they are older
//! than the freshness window. Events created through the engine are added
//! to the cached list right away, so the list stays usable for dedup within
//! a run without going back to the platform.

use chrono::Duration;
use tracing::debug;

use crate::cache::TtlCache;
use crate::constants::DEFAULT_LIST_TTL_SECS;
use crate::error::{EventsBotError, EventsBotResult};
use crate::event::{Channel, RemoteEvent};
use crate::platform::Platform;

pub struct RemoteView<P> {
    platform: P,
    events: TtlCache<Vec<RemoteEvent>>,
    channels: TtlCache<Vec<Channel>>,
}

impl<P: Platform> RemoteView<P> {
    pub fn new(platform: P) -> Self {
        Self::with_ttl(platform, Duration::seconds(DEFAULT_LIST_TTL_SECS))
    }

    pub fn with_ttl(platform: P, ttl: Duration) -> Self {
        RemoteView {
            platform,
            events: TtlCache::new(ttl),
            channels: TtlCache::new(ttl),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The guild's scheduled events, fetched when the cache is empty or stale.
    pub async fn events(&mut self) -> EventsBotResult<&[RemoteEvent]> {
        self.events.invalidate_if_expired();

        if self.events.get().is_none() {
            let events = self.platform.list_events().await?;
            debug!(count = events.len(), "Fetched scheduled events");
            self.events.set(events);
        }

        Ok(self
            .events
            .get()
            .map(|(events, _)| events.as_slice())
            .unwrap_or_default())
    }

    pub async fn channels(&mut self) -> EventsBotResult<&[Channel]> {
        self.channels.invalidate_if_expired();

        if self.channels.get().is_none() {
            let channels = self.platform.list_channels().await?;
            debug!(count = channels.len(), "Fetched channels");
            self.channels.set(channels);
        }

        Ok(self
            .channels
            .get()
            .map(|(channels, _)| channels.as_slice())
            .unwrap_or_default())
    }

    pub async fn event_id_exists(&mut self, id: &str) -> EventsBotResult<bool> {
        Ok(self
            .events()
            .await?
            .iter()
            .any(|event| event.id.as_deref() == Some(id)))
    }

    /// Id of the first channel named `name`.
    pub async fn resolve_channel_id(&mut self, name: &str) -> EventsBotResult<String> {
        self.channels()
            .await?
            .iter()
            .find(|channel| channel.name == name)
            .map(|channel| channel.id.clone())
            .ok_or_else(|| EventsBotError::ChannelNotFound(name.to_string()))
    }

    /// Add an event created during this run to the cached list.
    pub fn record_created(&mut self, event: RemoteEvent) {
        self.events.push(event);
    }

    #[cfg(test)]
    pub fn invalidate(&mut self) {
        self.events.invalidate();
        self.channels.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::FakePlatform;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn event(id: &str) -> RemoteEvent {
        RemoteEvent {
            id: Some(id.to_string()),
            name: "Meetup".to_string(),
            description: String::new(),
            start: Utc.with_ymd_and_hms(2024, 3, 20, 18, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 20, 20, 0, 0).unwrap(),
            metadata: BTreeMap::new(),
            privacy_level: 2,
        }
    }

    #[tokio::test]
    async fn test_events_are_cached() {
        let platform = FakePlatform::default();
        platform.state().events.push(event("1"));
        let mut view = RemoteView::new(platform.clone());

        assert_eq!(view.events().await.unwrap().len(), 1);
        platform.state().events.push(event("2"));
        assert_eq!(view.events().await.unwrap().len(), 1);
        assert_eq!(platform.state().list_calls, 1);

        view.invalidate();
        assert_eq!(view.events().await.unwrap().len(), 2);
        assert_eq!(platform.state().list_calls, 2);
    }

    #[tokio::test]
    async fn test_record_created_extends_cached_list() {
        let mut view = RemoteView::new(FakePlatform::default());
        assert!(!view.event_id_exists("9").await.unwrap());

        view.record_created(event("9"));
        assert!(view.event_id_exists("9").await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_channel_id() {
        let mut view = RemoteView::new(FakePlatform::with_general_channel());

        assert_eq!(view.resolve_channel_id("general").await.unwrap(), "c-general");
        assert!(matches!(
            view.resolve_channel_id("random").await,
            Err(EventsBotError::ChannelNotFound(name)) if name == "random"
        ));
    }

    #[tokio::test]
    async fn test_list_failure_is_not_cached() {
        let platform = FakePlatform::default();
        platform.state().fail_list = true;
        let mut view = RemoteView::new(platform.clone());

        assert!(view.events().await.is_err());
        platform.state().fail_list = false;
        assert!(view.events().await.is_ok());
    }
}
