//! Integration test common infrastructure.
//!
//! Provides a recording chat sender, a scripted follow-age lookup and helpers
//! for building a dispatcher over an in-memory database.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use talerbot::chat::{ChatError, ChatEvent, ChatMessage, ChatSender};
use talerbot::config::FailurePolicy;
use talerbot::db::Database;
use talerbot::dispatch::{Dispatcher, DispatcherParams, Shutdown};
use talerbot::followage::{FollowAge, FollowAgeError, FollowAgeLookup};

pub const CHANNEL: &str = "curi";

/// Something the bot sent to chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { channel: String, text: String },
    Whisper { user: String, text: String },
}

/// Chat sender that records every outbound call.
#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingChat {
    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait]
impl ChatSender for RecordingChat {
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.sent.lock().unwrap().push(Sent::Message {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_whisper(&self, user: &str, text: &str) -> Result<(), ChatError> {
        self.sent.lock().unwrap().push(Sent::Whisper {
            user: user.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Follow-age lookup answering from a script, one response per call.
///
/// `None` entries produce a network error.
#[derive(Default)]
pub struct ScriptedFollowAge {
    responses: Mutex<VecDeque<Option<FollowAge>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedFollowAge {
    pub fn push(&self, response: Option<FollowAge>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FollowAgeLookup for ScriptedFollowAge {
    async fn follow_age(&self, channel: &str, user: &str) -> Result<FollowAge, FollowAgeError> {
        self.calls
            .lock()
            .unwrap()
            .push((channel.to_string(), user.to_string()));

        let next = self.responses.lock().unwrap().pop_front().flatten();
        match next {
            Some(age) => Ok(age),
            None => Err(unreachable_service().await),
        }
    }
}

/// A real reqwest error from a port nothing listens on.
async fn unreachable_service() -> FollowAgeError {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = reqwest::get(format!("http://{}/", addr)).await.unwrap_err();
    FollowAgeError::Request(err)
}

/// A dispatcher wired to recording collaborators.
pub struct TestBot {
    pub dispatcher: Dispatcher,
    pub db: Database,
    pub chat: Arc<RecordingChat>,
    pub followage: Arc<ScriptedFollowAge>,
}

impl TestBot {
    pub async fn new() -> Self {
        Self::with_options(FailurePolicy::Halt, Duration::ZERO).await
    }

    pub async fn with_options(on_failure: FailurePolicy, cooldown: Duration) -> Self {
        let db = Database::new(":memory:").await.unwrap();
        Self::with_db(db, on_failure, cooldown)
    }

    pub fn with_db(db: Database, on_failure: FailurePolicy, cooldown: Duration) -> Self {
        Self::build(db, on_failure, cooldown, HashMap::new())
    }

    /// A connected bot that also answers to `(alias, command)` names.
    pub async fn with_aliases(aliases: &[(&str, &str)]) -> Self {
        let db = Database::new(":memory:").await.unwrap();
        let aliases = aliases
            .iter()
            .map(|(alias, target)| (alias.to_string(), target.to_string()))
            .collect();
        let mut bot = Self::build(db, FailurePolicy::Halt, Duration::from_secs(60), aliases);
        bot.connect().await;
        bot
    }

    fn build(
        db: Database,
        on_failure: FailurePolicy,
        cooldown: Duration,
        aliases: HashMap<String, String>,
    ) -> Self {
        let chat = Arc::new(RecordingChat::default());
        let followage = Arc::new(ScriptedFollowAge::default());

        let dispatcher = Dispatcher::new(DispatcherParams {
            db: db.clone(),
            chat: chat.clone(),
            followage: followage.clone(),
            channel: CHANNEL.to_string(),
            on_failure,
            cooldown,
            aliases,
        });

        Self {
            dispatcher,
            db,
            chat,
            followage,
        }
    }

    /// A bot that has already received `Connected`.
    pub async fn connected() -> Self {
        let mut bot = Self::new().await;
        bot.connect().await;
        bot
    }

    pub async fn connect(&mut self) {
        let outcome = self.dispatcher.handle_event(ChatEvent::Connected).await;
        assert!(matches!(outcome, Ok(None)));
    }

    /// Deliver a message and return the dispatcher's verdict.
    pub async fn send(
        &mut self,
        from: &ChatMessage,
    ) -> Result<Option<Shutdown>, talerbot::error::BotError> {
        self.dispatcher
            .handle_event(ChatEvent::Message(from.clone()))
            .await
    }

    /// Deliver a message that must not stop the loop.
    pub async fn say(&mut self, from: &ChatMessage) {
        let outcome = self.send(from).await;
        assert!(matches!(outcome, Ok(None)), "unexpected outcome: {:?}", outcome);
    }
}

pub fn message(login: &str, display: &str, text: &str) -> ChatMessage {
    ChatMessage {
        channel: CHANNEL.to_string(),
        sender_login: login.to_string(),
        sender_display_name: display.to_string(),
        is_broadcaster: false,
        is_moderator: false,
        text: text.to_string(),
    }
}

pub fn viewer(text: &str) -> ChatMessage {
    message("bob", "Bob", text)
}

pub fn moderator(text: &str) -> ChatMessage {
    ChatMessage {
        is_moderator: true,
        ..message("modmia", "ModMia", text)
    }
}

pub fn broadcaster(text: &str) -> ChatMessage {
    ChatMessage {
        is_broadcaster: true,
        ..message("curi", "Curi", text)
    }
}

pub fn public(text: &str) -> Sent {
    Sent::Message {
        channel: CHANNEL.to_string(),
        text: text.to_string(),
    }
}
