//! talerbot - Twitch chat bot for custom commands and Taler counters.
//!
//! Chat events flow through a single [`dispatch::Dispatcher`] that keeps an
//! in-memory mirror of the SQLite store and writes every change through.

pub mod chat;
pub mod classify;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod followage;
pub mod responder;
pub mod state;
pub mod telemetry;
