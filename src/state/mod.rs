//! Bot state owned by the dispatcher.
//!
//! - [`mirror`]: generic case-insensitive record cache
//! - [`cooldown`]: per-verb reply rate limiting

mod cooldown;
mod mirror;

pub use cooldown::Cooldowns;
pub use mirror::{Mirror, MirrorRecord, normalize_key};

use crate::db::{CommandRecord, TalerRecord};
use std::time::Duration;

impl MirrorRecord for CommandRecord {
    fn key(&self) -> &str {
        &self.name
    }

    fn set_key(&mut self, key: String) {
        self.name = key;
    }

    fn with_key(key: String) -> Self {
        Self::new(key, "")
    }
}

impl MirrorRecord for TalerRecord {
    fn key(&self) -> &str {
        &self.username
    }

    fn set_key(&mut self, key: String) {
        self.username = key;
    }

    fn with_key(key: String) -> Self {
        Self::new(key, 0)
    }
}

/// Everything the dispatcher mutates while handling events.
#[derive(Debug)]
pub struct BotState {
    pub commands: Mirror<CommandRecord>,
    pub talers: Mirror<TalerRecord>,
    pub cooldowns: Cooldowns,
}

impl BotState {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            commands: Mirror::new(),
            talers: Mirror::new(),
            cooldowns: Cooldowns::new(cooldown),
        }
    }
}
