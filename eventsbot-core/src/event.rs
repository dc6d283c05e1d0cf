//! Calendar and remote event types.
//!
//! `CalendarEvent` is what the feed yields for the week; `RemoteEvent` is the
//! scheduled event as the platform knows it. The two meet through
//! [`RemoteEvent::from_calendar_event`] and the structural equality below,
//! which is what keeps the bot from creating the same event twice.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discord `GUILD_ONLY` privacy level, the only one scheduled events accept.
pub const PRIVACY_LEVEL_GUILD_ONLY: u8 = 2;

/// Metadata key holding an external event's location.
pub const LOCATION_KEY: &str = "location";

/// An event occurring in the calendar window (no durable id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub name: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
}

/// A scheduled event on the remote platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// Assigned by the platform, `None` until created
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub metadata: BTreeMap<String, String>,
    pub privacy_level: u8,
}

impl RemoteEvent {
    /// Normalize a calendar event into the form it takes on the platform.
    pub fn from_calendar_event(event: &CalendarEvent, default_location: &str) -> Self {
        let location = event
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(default_location);

        RemoteEvent {
            id: None,
            name: event.name.clone(),
            description: event.description.clone().unwrap_or_default(),
            start: event.start,
            end: event.end,
            metadata: BTreeMap::from([(LOCATION_KEY.to_string(), location.to_string())]),
            privacy_level: PRIVACY_LEVEL_GUILD_ONLY,
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.metadata.get(LOCATION_KEY).map(String::as_str)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Two events are the same when name, start, end, metadata and privacy
/// level match. Id and description are ignored; times compare as instants
/// at whole-second precision.
impl PartialEq for RemoteEvent {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.start.timestamp() == other.start.timestamp()
            && self.end.timestamp() == other.end.timestamp()
            && self.metadata == other.metadata
            && self.privacy_level == other.privacy_level
    }
}

impl Eq for RemoteEvent {}

impl fmt::Display for RemoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.name, self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// A guild text channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub id: String,
}

/// A message posted by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub message_id: String,
    pub channel_id: String,
}
