//! Discord API payloads.
//!
//! Only the fields the bot reads or sends are modeled; serde ignores the
//! rest of each object.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use eventsbot_core::event::{Channel, LOCATION_KEY, PostedMessage, RemoteEvent};
use serde::{Deserialize, Serialize};

/// `EXTERNAL` scheduled event: happens somewhere outside the guild.
pub const ENTITY_TYPE_EXTERNAL: u8 = 3;

#[derive(Debug, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub scheduled_start_time: DateTime<Utc>,
    /// Only external events are required to have one
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub privacy_level: u8,
    pub entity_metadata: Option<EntityMetadata>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<ScheduledEvent> for RemoteEvent {
    fn from(event: ScheduledEvent) -> Self {
        let metadata = event
            .entity_metadata
            .and_then(|m| m.location)
            .map(|location| BTreeMap::from([(LOCATION_KEY.to_string(), location)]))
            .unwrap_or_default();

        RemoteEvent {
            id: Some(event.id),
            name: event.name,
            description: event.description.unwrap_or_default(),
            start: event.scheduled_start_time,
            end: event.scheduled_end_time.unwrap_or(event.scheduled_start_time),
            metadata,
            privacy_level: event.privacy_level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewScheduledEvent<'a> {
    pub name: &'a str,
    pub privacy_level: u8,
    pub scheduled_start_time: DateTime<Utc>,
    pub scheduled_end_time: DateTime<Utc>,
    pub description: &'a str,
    pub entity_metadata: EntityMetadata,
    pub entity_type: u8,
}

impl<'a> From<&'a RemoteEvent> for NewScheduledEvent<'a> {
    fn from(event: &'a RemoteEvent) -> Self {
        NewScheduledEvent {
            name: &event.name,
            privacy_level: event.privacy_level,
            scheduled_start_time: event.start,
            scheduled_end_time: event.end,
            description: &event.description,
            entity_metadata: EntityMetadata {
                location: event.location().map(str::to_string),
            },
            entity_type: ENTITY_TYPE_EXTERNAL,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GuildChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl GuildChannel {
    /// Unnamed channels can't be addressed by name, so they are skipped.
    pub fn into_channel(self) -> Option<Channel> {
        self.name.map(|name| Channel { name, id: self.id })
    }
}

#[derive(Debug, Serialize)]
pub struct NewMessage<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
}

#[derive(Debug, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<&'static str>,
}

impl AllowedMentions {
    pub fn everyone() -> Self {
        AllowedMentions {
            parse: vec!["everyone"],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
}

impl From<Message> for PostedMessage {
    fn from(message: Message) -> Self {
        PostedMessage {
            message_id: message.id,
            channel_id: message.channel_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewInvite {
    /// Seconds before expiry, 0 for never
    pub max_age: u32,
}

#[derive(Debug, Deserialize)]
pub struct Invite {
    pub code: String,
}

/// Body of a 429 response.
#[derive(Debug, Deserialize)]
pub struct RateLimit {
    pub retry_after: f64,
}

/// Body of an error response.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
}
