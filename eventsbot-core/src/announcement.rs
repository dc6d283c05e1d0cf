//! Announcement messages posted for newly created events.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHANNEL, DEFAULT_MESSAGE, DISCORD_SHORT_URL};

/// How new events get announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Announcement {
    /// Channel name, resolved to an id at posting time
    pub channel: String,
    pub content: String,
    pub mention_everyone: bool,
    /// Append an invite link pointing at the event
    pub link: bool,
}

impl Default for Announcement {
    fn default() -> Self {
        Announcement {
            channel: DEFAULT_CHANNEL.to_string(),
            content: DEFAULT_MESSAGE.to_string(),
            mention_everyone: false,
            link: false,
        }
    }
}

impl Announcement {
    /// Text of the message announcing `event_id`.
    ///
    /// The invite code is only used when `link` is set.
    pub fn compose(&self, invite_code: Option<&str>, event_id: &str) -> String {
        let mut text = String::new();

        if self.mention_everyone {
            text.push_str("@everyone ");
        }
        text.push_str(&self.content);

        if let Some(code) = invite_code.filter(|_| self.link) {
            text.push_str(&format!(" {DISCORD_SHORT_URL}/{code}?event={event_id}"));
        }

        text
    }
}
