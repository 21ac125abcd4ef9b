//! Chat platform boundary.
//!
//! The reconciler only needs to read recent messages, send, edit and delete.
//! [`DiscordChannel`] implements this over the Discord REST API.

pub mod discord;
#[cfg(test)]
pub(crate) mod memory;
mod split;

use async_trait::async_trait;

use crate::error::Result;

pub use discord::DiscordChannel;
pub use split::{MESSAGE_LIMIT, split_message};

/// A message as seen in the channel history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub editable: bool,
    pub deletable: bool,
}

/// Operations on a single text channel.
///
/// Fetches return messages newest first.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Identity of the bot account, compared against message authors.
    fn bot_user_id(&self) -> &str;

    /// The `limit` most recent messages.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>>;

    /// Up to `limit` messages immediately before the message `before`.
    async fn messages_before(&self, before: &str, limit: usize) -> Result<Vec<ChannelMessage>>;

    async fn send(&self, content: &str) -> Result<ChannelMessage>;

    async fn edit(&self, message_id: &str, content: &str) -> Result<()>;

    async fn delete(&self, message_id: &str) -> Result<()>;
}
