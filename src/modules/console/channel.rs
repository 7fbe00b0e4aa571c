use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GetMessages, Http, Message, UserId};
use std::{fmt, sync::Arc};

use super::relay::RelayError;

/// One message as seen in the console channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    /// Snowflake id, so larger means newer.
    pub id: u64,
    pub from_self: bool,
    pub content: String,
}

impl ConsoleMessage {
    pub fn from_discord(message: &Message, bot_id: UserId) -> Self {
        Self {
            id: message.id.get(),
            from_self: message.author.id == bot_id,
            content: message.content.clone(),
        }
    }
}

/// The text channel DiscordSRV bridges to the server console.
#[async_trait]
pub trait ConsoleChannel: Send + Sync + fmt::Debug {
    fn id(&self) -> u64;

    /// Posts one console command line and returns the id of the posted message.
    async fn send(&self, line: &str) -> Result<u64, RelayError>;

    /// Newest first.
    async fn recent(&self, limit: u8) -> Result<Vec<ConsoleMessage>, RelayError>;
}

#[derive(Clone)]
pub struct DiscordConsole {
    http: Arc<Http>,
    channel_id: ChannelId,
    bot_id: UserId,
}

impl DiscordConsole {
    pub fn new(http: Arc<Http>, channel_id: ChannelId, bot_id: UserId) -> Self {
        Self {
            http,
            channel_id,
            bot_id,
        }
    }
}

impl fmt::Debug for DiscordConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConsole")
            .field("channel_id", &self.channel_id)
            .field("bot_id", &self.bot_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ConsoleChannel for DiscordConsole {
    fn id(&self) -> u64 {
        self.channel_id.get()
    }

    async fn send(&self, line: &str) -> Result<u64, RelayError> {
        let message = self.channel_id.say(&self.http, line).await?;
        Ok(message.id.get())
    }

    async fn recent(&self, limit: u8) -> Result<Vec<ConsoleMessage>, RelayError> {
        // Fetched over HTTP rather than from the cache so late console output is seen.
        let messages = self
            .channel_id
            .messages(self.http.as_ref(), GetMessages::new().limit(limit))
            .await?;
        Ok(messages
            .iter()
            .map(|message| ConsoleMessage::from_discord(message, self.bot_id))
            .collect())
    }
}
