//! Command classification and authorization.
//!
//! Turns raw chat text into an [`Invocation`] and decides whether the sender's
//! [`Role`] may run it. Built-in verbs are matched case-sensitively; anything
//! else becomes a custom command lookup.

use crate::chat::ChatMessage;

/// Prefix that marks a chat message as a command.
pub const COMMAND_PREFIX: char = '!';

/// Sender role, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Viewer,
    Moderator,
    Broadcaster,
}

impl Role {
    pub fn of(message: &ChatMessage) -> Self {
        if message.is_broadcaster {
            Self::Broadcaster
        } else if message.is_moderator {
            Self::Moderator
        } else {
            Self::Viewer
        }
    }
}

/// A built-in verb, or the name of a custom command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Quit,
    EditCmd,
    DeleteCmd,
    AddTaler,
    MoveTaler,
    Help,
    Taler,
    FollowAge,
    Custom(String),
}

impl Verb {
    pub fn from_name(name: &str) -> Self {
        match name {
            "quit" => Self::Quit,
            "editcmd" => Self::EditCmd,
            "deletecmd" => Self::DeleteCmd,
            "addtaler" => Self::AddTaler,
            "movetaler" => Self::MoveTaler,
            "help" => Self::Help,
            "taler" => Self::Taler,
            "followage" => Self::FollowAge,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Quit => "quit",
            Self::EditCmd => "editcmd",
            Self::DeleteCmd => "deletecmd",
            Self::AddTaler => "addtaler",
            Self::MoveTaler => "movetaler",
            Self::Help => "help",
            Self::Taler => "taler",
            Self::FollowAge => "followage",
            Self::Custom(name) => name,
        }
    }

    /// Minimum role needed to run this verb.
    pub fn required_role(&self) -> Role {
        match self {
            Self::Quit | Self::AddTaler | Self::MoveTaler => Role::Broadcaster,
            Self::EditCmd | Self::DeleteCmd => Role::Moderator,
            Self::Help | Self::Taler | Self::FollowAge | Self::Custom(_) => Role::Viewer,
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        role >= self.required_role()
    }
}

/// A parsed command: verb plus the remaining space-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub verb: Verb,
    pub args: Vec<String>,
}

impl Invocation {
    /// Argument `n`, if present and non-empty.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.args
            .get(n)
            .map(String::as_str)
            .filter(|arg| !arg.is_empty())
    }

    /// Arguments from `n` on, rejoined with single spaces.
    pub fn rest(&self, n: usize) -> String {
        self.args.get(n..).unwrap_or_default().join(" ")
    }
}

/// Parse message text. Returns `None` when the text is not a command.
///
/// Tokens are split on single spaces, so repeated spaces survive in
/// [`Invocation::rest`].
pub fn parse(text: &str) -> Option<Invocation> {
    let mut tokens = text.split(' ');
    let first = tokens.next()?;
    if !first.starts_with(COMMAND_PREFIX) {
        return None;
    }

    Some(Invocation {
        verb: Verb::from_name(first.trim_start_matches(COMMAND_PREFIX)),
        args: tokens.map(str::to_string).collect(),
    })
}

/// Normalize a username argument: drop leading `@`s and lowercase.
pub fn normalize_username(username: &str) -> String {
    username.trim_start_matches('@').to_lowercase()
}
