//! Verb handlers, one file per record set.

mod commands;
mod followage;
mod talers;
