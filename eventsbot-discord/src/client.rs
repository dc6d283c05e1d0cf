use std::time::Duration;

use async_trait::async_trait;
use eventsbot_core::constants::DEFAULT_TIMEOUT_SECS;
use eventsbot_core::error::EventsBotResult;
use eventsbot_core::event::{Channel, PostedMessage, RemoteEvent};
use eventsbot_core::platform::{DeleteOutcome, Platform};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::DiscordError;
use crate::types::{
    AllowedMentions, ApiError, GuildChannel, Invite, Message, NewInvite, NewMessage,
    NewScheduledEvent, RateLimit, ScheduledEvent,
};

const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";

/// Retries of a rate-limited request before giving up.
const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Upper bound on a single rate-limit wait.
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Client for one Discord guild, authenticated as a bot.
pub struct DiscordGuild {
    http: reqwest::Client,
    token: String,
    user_agent: String,
    guild_id: String,
    base_url: String,
}

impl DiscordGuild {
    pub fn new(
        token: impl Into<String>,
        bot_url: &str,
        guild_id: impl Into<String>,
    ) -> Result<Self, DiscordError> {
        Self::with_base_url(token, bot_url, guild_id, DEFAULT_BASE_URL)
    }

    /// Creates a client talking to another API root.
    pub fn with_base_url(
        token: impl Into<String>,
        bot_url: &str,
        guild_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, DiscordError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            token: token.into(),
            user_agent: format!("DiscordBot ({}, {})", bot_url, env!("CARGO_PKG_VERSION")),
            guild_id: guild_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    /// Send a request, waiting out rate limits.
    ///
    /// A 429 is retried after the delay Discord asks for (capped), up to
    /// `MAX_RATE_LIMIT_RETRIES` times. Any other response is returned as is.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, DiscordError> {
        let url = format!("{}{}", self.base_url, path);
        let mut retries = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .header(AUTHORIZATION, format!("Bot {}", self.token))
                .header(USER_AGENT, &self.user_agent);
            if let Some(body) = &body {
                request = request.json(body);
            }

            let response = request.send().await?;
            debug!(%method, path, status = response.status().as_u16(), "Discord API response");

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            if retries >= MAX_RATE_LIMIT_RETRIES {
                warn!(%method, path, retries, "Giving up on rate-limited request");
                return Err(DiscordError::RateLimited(retries));
            }

            let wait = retry_after(response).await.min(MAX_RATE_LIMIT_WAIT);
            info!(seconds = wait.as_secs_f64(), "Rate limiting hit, waiting");
            tokio::time::sleep(wait).await;
            retries += 1;
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiscordError> {
        let response = self.send(Method::GET, path, None).await?;
        parse_json(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DiscordError> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, path, Some(body)).await?;
        parse_json(response).await
    }

    #[instrument(skip(self), fields(guild = %self.guild_id))]
    pub async fn scheduled_events(&self) -> Result<Vec<RemoteEvent>, DiscordError> {
        let events: Vec<ScheduledEvent> = self
            .get(&format!("/guilds/{}/scheduled-events", self.guild_id))
            .await?;
        Ok(events.into_iter().map(RemoteEvent::from).collect())
    }

    #[instrument(skip(self), fields(guild = %self.guild_id))]
    pub async fn channels(&self) -> Result<Vec<Channel>, DiscordError> {
        let channels: Vec<GuildChannel> = self
            .get(&format!("/guilds/{}/channels", self.guild_id))
            .await?;
        Ok(channels
            .into_iter()
            .filter_map(GuildChannel::into_channel)
            .collect())
    }

    #[instrument(skip(self, event), fields(guild = %self.guild_id, event = %event.name))]
    pub async fn create_scheduled_event(&self, event: &RemoteEvent) -> Result<String, DiscordError> {
        let created: ScheduledEvent = self
            .post(
                &format!("/guilds/{}/scheduled-events", self.guild_id),
                &NewScheduledEvent::from(event),
            )
            .await?;
        Ok(created.id)
    }

    #[instrument(skip(self, content))]
    pub async fn post_message(
        &self,
        channel_id: &str,
        content: &str,
        mention_everyone: bool,
    ) -> Result<PostedMessage, DiscordError> {
        let body = NewMessage {
            content,
            allowed_mentions: mention_everyone.then(AllowedMentions::everyone),
        };
        let message: Message = self
            .post(&format!("/channels/{}/messages", channel_id), &body)
            .await?;
        Ok(message.into())
    }

    #[instrument(skip(self))]
    pub async fn create_channel_invite(&self, channel_id: &str) -> Result<String, DiscordError> {
        let invite: Invite = self
            .post(
                &format!("/channels/{}/invites", channel_id),
                &NewInvite { max_age: 0 },
            )
            .await?;
        Ok(invite.code)
    }

    /// Delete a message. A 404 means it is already gone, which is not an error.
    #[instrument(skip(self))]
    pub async fn remove_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<DeleteOutcome, DiscordError> {
        let response = self
            .send(
                Method::DELETE,
                &format!("/channels/{}/messages/{}", channel_id, message_id),
                None,
            )
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => {
                info!("Message deleted");
                Ok(DeleteOutcome::Deleted)
            }
            StatusCode::NOT_FOUND => {
                warn!("Channel or message not found");
                Ok(DeleteOutcome::NotFound)
            }
            _ => Err(api_error(response).await),
        }
    }
}

#[async_trait]
impl Platform for DiscordGuild {
    async fn list_events(&self) -> EventsBotResult<Vec<RemoteEvent>> {
        Ok(self.scheduled_events().await?)
    }

    async fn list_channels(&self) -> EventsBotResult<Vec<Channel>> {
        Ok(self.channels().await?)
    }

    async fn create_event(&self, event: &RemoteEvent) -> EventsBotResult<String> {
        Ok(self.create_scheduled_event(event).await?)
    }

    async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
        mention_everyone: bool,
    ) -> EventsBotResult<PostedMessage> {
        Ok(self.post_message(channel_id, content, mention_everyone).await?)
    }

    async fn create_invite(&self, channel_id: &str) -> EventsBotResult<String> {
        Ok(self.create_channel_invite(channel_id).await?)
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> EventsBotResult<DeleteOutcome> {
        Ok(self.remove_message(channel_id, message_id).await?)
    }
}

/// How long a 429 response asks us to wait.
///
/// The `X-RateLimit-Reset-After` header wins over the body's `retry_after`;
/// with neither, wait one second.
async fn retry_after(response: Response) -> Duration {
    let header = response
        .headers()
        .get("X-RateLimit-Reset-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok());

    let seconds = match header {
        Some(seconds) => Some(seconds),
        None => response
            .json::<RateLimit>()
            .await
            .ok()
            .map(|limit| limit.retry_after),
    };

    seconds
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .unwrap_or(Duration::from_secs(1))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, DiscordError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn api_error(response: Response) -> DiscordError {
    let status = response.status();
    let message = response
        .json::<ApiError>()
        .await
        .map(|e| e.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());

    DiscordError::Api {
        status: status.as_u16(),
        message,
    }
}
