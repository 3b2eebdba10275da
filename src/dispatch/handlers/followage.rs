//! `followage` verb.

use crate::chat::ChatMessage;
use crate::dispatch::Dispatcher;
use crate::error::HandlerResult;
use crate::responder::{self, BotEffect};

impl Dispatcher {
    /// `!followage`: look up how long the sender has followed the channel.
    pub(crate) async fn handle_followage(&mut self, message: &ChatMessage) -> HandlerResult {
        if !self.state.cooldowns.try_acquire("followage") {
            return Ok(vec![]);
        }

        let age = self
            .followage
            .follow_age(&message.channel, &message.sender_login)
            .await?;

        let reply =
            responder::followage_reply(&message.sender_display_name, &message.channel, &age);
        Ok(vec![BotEffect::say(&message.channel, reply)])
    }
}
