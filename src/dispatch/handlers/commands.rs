//! Custom command verbs: `editcmd`, `deletecmd`, `help` and the default path.

use crate::chat::ChatMessage;
use crate::classify::Invocation;
use crate::dispatch::Dispatcher;
use crate::error::HandlerResult;
use crate::responder::{self, BotEffect};
use crate::state::{MirrorRecord, normalize_key};
use tracing::{debug, info};

impl Dispatcher {
    /// `!editcmd <name> <text...>`: create or overwrite a custom command.
    pub(crate) async fn handle_editcmd(&mut self, invocation: &Invocation) -> HandlerResult {
        let Some(name) = invocation.arg(0) else {
            return Ok(vec![]);
        };

        let (command, created) = self.state.commands.get_or_create(name);
        command.value = invocation.rest(1);
        let record = command.clone();

        self.db.commands().upsert(&record).await?;

        info!(command = %record.key(), created, "Command saved");
        Ok(vec![])
    }

    /// `!deletecmd <name>`: drop a custom command. Unknown names are a no-op.
    pub(crate) async fn handle_deletecmd(&mut self, invocation: &Invocation) -> HandlerResult {
        let Some(name) = invocation.arg(0) else {
            return Ok(vec![]);
        };

        let cached = self.state.commands.remove(name);
        let key = normalize_key(name);
        let stored = self.db.commands().delete(&key).await?;

        info!(command = %key, cached = cached.is_some(), stored, "Command deleted");
        Ok(vec![])
    }

    /// `!help`: list every command viewers can use.
    pub(crate) fn handle_help(&mut self, message: &ChatMessage) -> Vec<BotEffect> {
        if !self.state.cooldowns.try_acquire("help") {
            return vec![];
        }

        let reply = responder::help_reply(self.state.commands.iter().map(|c| c.name.as_str()));
        vec![BotEffect::say(&message.channel, reply)]
    }

    /// Any other verb: reply with the stored text of a known custom command.
    ///
    /// Aliases resolve to their command first and share its cooldown.
    pub(crate) fn handle_custom(&mut self, message: &ChatMessage, name: &str) -> Vec<BotEffect> {
        let key = normalize_key(name);
        let key = self.aliases.get(&key).cloned().unwrap_or(key);

        let Some(command) = self.state.commands.lookup(&key) else {
            debug!(command = %key, "Unknown command ignored");
            return vec![];
        };
        let text = command.value.clone();

        if !self.state.cooldowns.try_acquire(&key) {
            return vec![];
        }

        vec![BotEffect::say(&message.channel, text)]
    }
}
