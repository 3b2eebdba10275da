//! Database models for the mirrored record sets.

/// A custom text command, keyed by its lowercase name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub name: String,
    /// Reply text sent when the command is triggered. May be empty.
    pub value: String,
}

impl CommandRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A per-user Taler counter, keyed by lowercase username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalerRecord {
    pub username: String,
    pub amount: i64,
}

impl TalerRecord {
    pub fn new(username: impl Into<String>, amount: i64) -> Self {
        Self {
            username: username.into(),
            amount,
        }
    }
}
