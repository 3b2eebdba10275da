//! Chat connection boundary.
//!
//! The dispatcher only sees [`ChatEvent`]s arriving on an mpsc channel and a
//! [`ChatSender`] for replies. [`twitch`] implements both on top of Twitch IRC.

pub mod twitch;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by the chat connection.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid channel name: {0}")]
    InvalidChannel(String),
    #[error("send failed: {0}")]
    Send(String),
}

/// A chat message delivered to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel login, without a leading `#`.
    pub channel: String,
    /// Sender login (lowercase).
    pub sender_login: String,
    /// Sender display name as shown in chat.
    pub sender_display_name: String,
    pub is_broadcaster: bool,
    pub is_moderator: bool,
    pub text: String,
}

/// Events that the chat connection feeds into the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Login to the chat server succeeded.
    Connected,
    /// A message was posted in the channel.
    Message(ChatMessage),
}

/// Outbound side of the chat connection.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Post a public message to `channel`.
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ChatError>;

    /// Send a private whisper to `user`.
    async fn send_whisper(&self, user: &str, text: &str) -> Result<(), ChatError>;
}
