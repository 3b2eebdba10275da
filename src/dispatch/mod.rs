//! Event dispatch loop.
//!
//! The `Dispatcher` owns the in-memory mirrors and processes chat events one
//! at a time, in arrival order. Every event runs to completion (classify,
//! authorize, mutate mirror, persist, reply) before the next is received, so
//! the mirrors need no locking.
//!
//! # State machine
//!
//! - `Disconnected`: initial. Messages are ignored until the mirrors are hydrated.
//! - `Connected`: entered on [`ChatEvent::Connected`] after loading both
//!   record sets from the store. Left only by an authorized `quit`, a fatal
//!   error, or the event stream closing.

mod handlers;

use crate::chat::{ChatEvent, ChatMessage, ChatSender};
use crate::classify::{self, Invocation, Role, Verb};
use crate::config::FailurePolicy;
use crate::db::Database;
use crate::error::{BotError, HandlerResult};
use crate::followage::FollowAgeLookup;
use crate::responder::{self, BotEffect};
use crate::state::{BotState, normalize_key};
use crate::telemetry::spans;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disconnected,
    Connected,
}

/// Why the event loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The broadcaster sent `!quit`.
    Quit,
    /// The chat connection dropped its end of the event channel.
    StreamClosed,
}

/// Construction parameters for [`Dispatcher`].
pub struct DispatcherParams {
    pub db: Database,
    pub chat: Arc<dyn ChatSender>,
    pub followage: Arc<dyn FollowAgeLookup>,
    /// The only channel whose messages are handled.
    pub channel: String,
    pub on_failure: FailurePolicy,
    pub cooldown: Duration,
    /// Alternative names for custom commands, alias to command name.
    pub aliases: HashMap<String, String>,
}

/// Single-writer event processor.
pub struct Dispatcher {
    state: BotState,
    db: Database,
    chat: Arc<dyn ChatSender>,
    followage: Arc<dyn FollowAgeLookup>,
    channel: String,
    on_failure: FailurePolicy,
    aliases: HashMap<String, String>,
    phase: Phase,
}

impl Dispatcher {
    pub fn new(params: DispatcherParams) -> Self {
        Self {
            state: BotState::new(params.cooldown),
            db: params.db,
            chat: params.chat,
            followage: params.followage,
            channel: params.channel,
            on_failure: params.on_failure,
            aliases: params
                .aliases
                .into_iter()
                .map(|(alias, target)| (normalize_key(&alias), normalize_key(&target)))
                .collect(),
            phase: Phase::Disconnected,
        }
    }

    /// Current mirror contents.
    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.phase == Phase::Connected
    }

    /// The main loop. Blocks on the channel between events with no timeout.
    pub async fn run(mut self, mut rx: mpsc::Receiver<ChatEvent>) -> Result<Shutdown, BotError> {
        while let Some(event) = rx.recv().await {
            if let Some(shutdown) = self.handle_event(event).await? {
                info!(reason = ?shutdown, "Event loop stopped");
                return Ok(shutdown);
            }
        }

        warn!("Chat event stream closed");
        Ok(Shutdown::StreamClosed)
    }

    /// Process one event to completion.
    ///
    /// `Err` means the loop must stop: either the mirrors could not be loaded,
    /// or a command failed under [`FailurePolicy::Halt`].
    pub async fn handle_event(&mut self, event: ChatEvent) -> Result<Option<Shutdown>, BotError> {
        match event {
            ChatEvent::Connected => {
                self.hydrate().await?;
                self.phase = Phase::Connected;
                Ok(None)
            }
            ChatEvent::Message(message) => self.handle_message(message).await,
        }
    }

    /// Replace both mirrors with the store's contents.
    async fn hydrate(&mut self) -> Result<(), BotError> {
        let commands = self.db.commands().load_all().await.map_err(|e| {
            error!(error = %e, "Failed to load commands");
            e
        })?;
        let talers = self.db.talers().load_all().await.map_err(|e| {
            error!(error = %e, "Failed to load talers");
            e
        })?;

        info!(
            commands = commands.len(),
            talers = talers.len(),
            "Connected to chat, loaded all commands and talers"
        );

        self.state.commands.load_all(commands);
        self.state.talers.load_all(talers);
        Ok(())
    }

    async fn handle_message(&mut self, message: ChatMessage) -> Result<Option<Shutdown>, BotError> {
        if self.phase == Phase::Disconnected {
            debug!(sender = %message.sender_login, "Ignoring message before connect");
            return Ok(None);
        }
        if message.channel != self.channel {
            debug!(channel = %message.channel, "Ignoring message from foreign channel");
            return Ok(None);
        }

        let Some(invocation) = classify::parse(&message.text) else {
            return Ok(None);
        };

        let role = Role::of(&message);
        if !invocation.verb.permits(role) {
            debug!(
                verb = %invocation.verb.name(),
                sender = %message.sender_login,
                role = ?role,
                "Unauthorized command dropped"
            );
            return Ok(None);
        }

        let span = spans::command(invocation.verb.name(), &message.sender_login);
        let result = self.execute(&message, &invocation).instrument(span).await;

        match result {
            Ok(effects) => {
                let quit = responder::apply_effects(self.chat.as_ref(), effects).await;
                Ok(quit.then_some(Shutdown::Quit))
            }
            Err(e) => self.fail(&message, &invocation, e).await,
        }
    }

    /// Route an authorized invocation to its verb handler.
    async fn execute(&mut self, message: &ChatMessage, invocation: &Invocation) -> HandlerResult {
        match &invocation.verb {
            Verb::Quit => Ok(vec![BotEffect::Quit]),
            Verb::EditCmd => self.handle_editcmd(invocation).await,
            Verb::DeleteCmd => self.handle_deletecmd(invocation).await,
            Verb::AddTaler => self.handle_addtaler(invocation).await,
            Verb::MoveTaler => self.handle_movetaler(invocation).await,
            Verb::Help => Ok(self.handle_help(message)),
            Verb::Taler => Ok(self.handle_taler(message)),
            Verb::FollowAge => self.handle_followage(message).await,
            Verb::Custom(name) => Ok(self.handle_custom(message, name)),
        }
    }

    /// Report a failed command to its sender, then apply the failure policy.
    async fn fail(
        &mut self,
        message: &ChatMessage,
        invocation: &Invocation,
        e: BotError,
    ) -> Result<Option<Shutdown>, BotError> {
        error!(
            verb = %invocation.verb.name(),
            sender = %message.sender_login,
            code = e.error_code(),
            error = %e,
            "Command failed"
        );

        responder::apply_effects(
            self.chat.as_ref(),
            vec![BotEffect::whisper(&message.sender_login, e.to_string())],
        )
        .await;

        match self.on_failure {
            FailurePolicy::Halt => Err(e),
            FailurePolicy::Continue => Ok(None),
        }
    }
}
