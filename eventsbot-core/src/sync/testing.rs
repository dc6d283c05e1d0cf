//! In-memory platform and calendar for engine tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::date_range::DateRange;
use crate::error::{EventsBotError, EventsBotResult};
use crate::event::{CalendarEvent, Channel, PostedMessage, RemoteEvent};
use crate::platform::{DeleteOutcome, Platform};
use crate::source::CalendarSource;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    pub mention_everyone: bool,
}

#[derive(Debug, Default)]
pub struct State {
    pub events: Vec<RemoteEvent>,
    pub channels: Vec<Channel>,
    pub messages: Vec<Message>,
    pub invites: usize,
    pub list_calls: usize,
    pub create_calls: usize,
    next_id: u64,
    pub fail_list: bool,
    pub fail_create: HashSet<String>,
    pub fail_delete: HashSet<String>,
}

/// Clones share state, so a test can keep a handle while the engine owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<State>>,
}

impl FakePlatform {
    pub fn with_general_channel() -> Self {
        let platform = FakePlatform::default();
        platform.state().channels.push(Channel {
            name: "general".to_string(),
            id: "c-general".to_string(),
        });
        platform
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn remove_event(&self, id: &str) {
        self.state()
            .events
            .retain(|event| event.id.as_deref() != Some(id));
    }

    fn next_id(state: &mut State, prefix: &str) -> String {
        state.next_id += 1;
        format!("{}-{}", prefix, state.next_id)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn list_events(&self) -> EventsBotResult<Vec<RemoteEvent>> {
        let mut state = self.state();
        state.list_calls += 1;
        if state.fail_list {
            return Err(EventsBotError::Platform("500 Internal Server Error".to_string()));
        }
        Ok(state.events.clone())
    }

    async fn list_channels(&self) -> EventsBotResult<Vec<Channel>> {
        Ok(self.state().channels.clone())
    }

    async fn create_event(&self, event: &RemoteEvent) -> EventsBotResult<String> {
        let mut state = self.state();
        state.create_calls += 1;
        if state.fail_create.contains(&event.name) {
            return Err(EventsBotError::Platform("400 Bad Request".to_string()));
        }
        let id = Self::next_id(&mut state, "e");
        state.events.push(event.clone().with_id(id.clone()));
        Ok(id)
    }

    async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
        mention_everyone: bool,
    ) -> EventsBotResult<PostedMessage> {
        let mut state = self.state();
        let id = Self::next_id(&mut state, "m");
        state.messages.push(Message {
            id: id.clone(),
            channel_id: channel_id.to_string(),
            content: content.to_string(),
            mention_everyone,
        });
        Ok(PostedMessage {
            message_id: id,
            channel_id: channel_id.to_string(),
        })
    }

    async fn create_invite(&self, _channel_id: &str) -> EventsBotResult<String> {
        let mut state = self.state();
        state.invites += 1;
        Ok(format!("inv{}", state.invites))
    }

    async fn delete_message(
        &self,
        _channel_id: &str,
        message_id: &str,
    ) -> EventsBotResult<DeleteOutcome> {
        let mut state = self.state();
        if state.fail_delete.contains(message_id) {
            return Err(EventsBotError::Platform("403 Forbidden".to_string()));
        }
        let before = state.messages.len();
        state.messages.retain(|message| message.id != message_id);
        if state.messages.len() < before {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}

/// A fixed list of events, filtered by range on each call.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub events: Vec<CalendarEvent>,
}

impl StaticSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        StaticSource { events }
    }
}

#[async_trait]
impl CalendarSource for StaticSource {
    async fn events_in(&self, range: &DateRange) -> EventsBotResult<Vec<CalendarEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| range.overlaps(e.start, e.end))
            .cloned()
            .collect())
    }
}
