//! Errors surfaced while handling a chat event.

use crate::db::DbError;
use crate::followage::FollowAgeError;
use crate::responder::BotEffect;
use thiserror::Error;

/// Failures that abort a single command.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("network error: {0}")]
    Network(#[from] FollowAgeError),
}

impl BotError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Store(_) => "store_error",
            Self::Network(_) => "network_error",
        }
    }
}

/// Result type for verb handlers: the effects to apply on success.
pub type HandlerResult = Result<Vec<BotEffect>, BotError>;
