//! The chat platform the bot publishes to.

use async_trait::async_trait;

use crate::error::EventsBotResult;
use crate::event::{Channel, PostedMessage, RemoteEvent};

/// Result of deleting a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The message was already gone
    NotFound,
}

/// Operations the reconciliation engine needs from a guild.
///
/// Implementations own transport concerns (timeouts, rate-limit retries);
/// the engine sees one result per call.
#[async_trait]
pub trait Platform: Send + Sync {
    /// All scheduled events of the guild.
    async fn list_events(&self) -> EventsBotResult<Vec<RemoteEvent>>;

    async fn list_channels(&self) -> EventsBotResult<Vec<Channel>>;

    /// Create a scheduled event, returning the id the platform gave it.
    async fn create_event(&self, event: &RemoteEvent) -> EventsBotResult<String>;

    async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
        mention_everyone: bool,
    ) -> EventsBotResult<PostedMessage>;

    /// Create a non-expiring invite to `channel_id`, returning its code.
    async fn create_invite(&self, channel_id: &str) -> EventsBotResult<String>;

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> EventsBotResult<DeleteOutcome>;
}
