//! Outbound replies.
//!
//! Verb handlers produce [`BotEffect`]s; [`apply_effects`] forwards them to
//! the chat connection. Delivery is fire-and-forget: send failures are logged
//! and otherwise ignored.

use crate::chat::ChatSender;
use crate::classify::COMMAND_PREFIX;
use crate::followage::FollowAge;
use tracing::{debug, warn};

/// Side effects requested by a verb handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEffect {
    /// Public message to a channel.
    Say { channel: String, text: String },
    /// Private whisper to a user.
    Whisper { user: String, text: String },
    /// Stop the event loop.
    Quit,
}

impl BotEffect {
    pub fn say(channel: &str, text: impl Into<String>) -> Self {
        Self::Say {
            channel: channel.to_string(),
            text: text.into(),
        }
    }

    pub fn whisper(user: &str, text: impl Into<String>) -> Self {
        Self::Whisper {
            user: user.to_string(),
            text: text.into(),
        }
    }
}

/// Reply to `!taler`.
pub fn taler_reply(display_name: &str, amount: i64) -> String {
    format!("@{}: Du hast {} Taler!", display_name, amount)
}

/// Reply to `!followage`.
pub fn followage_reply(display_name: &str, channel: &str, age: &FollowAge) -> String {
    match age {
        FollowAge::Following(duration) => {
            format!("@{}: Du folgst {} schon {}", display_name, channel, duration)
        }
        FollowAge::NotFollowing => format!("@{}: Du folgst {} nicht :(", display_name, channel),
    }
}

/// Reply to `!help`: every command the bot answers, sorted and without duplicates.
pub fn help_reply<'a>(custom_names: impl IntoIterator<Item = &'a str>) -> String {
    let mut names: Vec<String> = ["taler", "followage"]
        .into_iter()
        .chain(custom_names)
        .map(|name| format!("{}{}", COMMAND_PREFIX, name))
        .collect();
    names.sort();
    names.dedup();
    names.join(", ")
}

/// Forward effects to the chat connection in order.
///
/// Returns `true` if one of the effects asked the event loop to stop.
pub async fn apply_effects(chat: &dyn ChatSender, effects: Vec<BotEffect>) -> bool {
    let mut quit = false;

    for effect in effects {
        match effect {
            BotEffect::Say { channel, text } => {
                debug!(channel = %channel, text = %text, "Sending message");
                if let Err(e) = chat.send_message(&channel, &text).await {
                    warn!(channel = %channel, error = %e, "Failed to send message");
                }
            }
            BotEffect::Whisper { user, text } => {
                debug!(user = %user, text = %text, "Sending whisper");
                if let Err(e) = chat.send_whisper(&user, &text).await {
                    warn!(user = %user, error = %e, "Failed to send whisper");
                }
            }
            BotEffect::Quit => quit = true,
        }
    }

    quit
}
