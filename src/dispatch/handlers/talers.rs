//! Taler verbs: `addtaler`, `movetaler`, `taler`.

use crate::chat::ChatMessage;
use crate::classify::{Invocation, normalize_username};
use crate::dispatch::Dispatcher;
use crate::error::HandlerResult;
use crate::responder::{self, BotEffect};
use tracing::info;

impl Dispatcher {
    /// `!addtaler <user>`: award one Taler.
    pub(crate) async fn handle_addtaler(&mut self, invocation: &Invocation) -> HandlerResult {
        let Some(user) = invocation.arg(0) else {
            return Ok(vec![]);
        };
        let username = normalize_username(user);
        if username.is_empty() {
            return Ok(vec![]);
        }

        let (taler, _) = self.state.talers.get_or_create(&username);
        taler.amount = taler.amount.saturating_add(1);
        let record = taler.clone();

        self.db.talers().upsert(&record).await?;

        info!(user = %record.username, amount = record.amount, "Taler added");
        Ok(vec![])
    }

    /// `!movetaler <from> <to>`: move a counter to another user.
    ///
    /// An existing counter under `<to>` is overwritten, not merged.
    pub(crate) async fn handle_movetaler(&mut self, invocation: &Invocation) -> HandlerResult {
        let (Some(from), Some(to)) = (invocation.arg(0), invocation.arg(1)) else {
            return Ok(vec![]);
        };
        let from = normalize_username(from);
        let to = normalize_username(to);

        // Upsert-then-delete under the same key would erase the row.
        if from.is_empty() || to.is_empty() || from == to {
            return Ok(vec![]);
        }

        let record = self.state.talers.rename(&from, &to).clone();

        self.db.talers().upsert(&record).await?;
        self.db.talers().delete(&from).await?;

        info!(from = %from, to = %to, amount = record.amount, "Taler moved");
        Ok(vec![])
    }

    /// `!taler`: tell the sender how many Taler they have.
    pub(crate) fn handle_taler(&mut self, message: &ChatMessage) -> Vec<BotEffect> {
        if !self.state.cooldowns.try_acquire("taler") {
            return vec![];
        }

        let (taler, _) = self.state.talers.get_or_create(&message.sender_login);
        let reply = responder::taler_reply(&message.sender_display_name, taler.amount);
        vec![BotEffect::say(&message.channel, reply)]
    }
}
