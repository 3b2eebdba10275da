//! Twitch IRC adapter.
//!
//! Wraps a `twitch_irc` client: a forwarding task translates incoming
//! `ServerMessage`s into [`ChatEvent`]s on a bounded channel, and
//! [`TwitchSender`] implements [`ChatSender`].

use super::{ChatError, ChatEvent, ChatMessage, ChatSender};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use twitch_irc::login::StaticLoginCredentials;
use twitch_irc::message::{PrivmsgMessage, ServerMessage};
use twitch_irc::{ClientConfig, SecureTCPTransport, TwitchIRCClient};

type Client = TwitchIRCClient<SecureTCPTransport, StaticLoginCredentials>;

/// Channel whispers are routed through. Twitch treats `/w` in any channel the
/// same way.
///
/// Twitch no longer delivers whispers sent over chat. The line is accepted
/// and dropped, or answered with a NOTICE that [`translate`] only logs, so
/// error whispers reach the log but not the user. Real delivery needs the
/// Helix `POST /whispers` endpoint and a `user:manage:whispers` token.
const WHISPER_CHANNEL: &str = "jtv";

/// Outbound handle for a connected Twitch client.
#[derive(Clone)]
pub struct TwitchSender {
    client: Client,
}

#[async_trait]
impl ChatSender for TwitchSender {
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.client
            .say(channel.to_string(), text.to_string())
            .await
            .map_err(|e| ChatError::Send(e.to_string()))
    }

    async fn send_whisper(&self, user: &str, text: &str) -> Result<(), ChatError> {
        self.client
            .privmsg(WHISPER_CHANNEL.to_string(), format!("/w {} {}", user, text))
            .await
            .map_err(|e| ChatError::Send(e.to_string()))
    }
}

/// Connect to Twitch chat and join `channel`.
///
/// Returns the outbound sender and the event stream for the dispatcher. The
/// forwarding task ends when the client shuts down or the receiver is dropped.
pub fn connect(
    username: &str,
    token: &str,
    channel: &str,
    queue_size: usize,
) -> Result<(TwitchSender, mpsc::Receiver<ChatEvent>), ChatError> {
    let credentials = StaticLoginCredentials::new(
        username.to_lowercase(),
        Some(token.trim_start_matches("oauth:").to_string()),
    );
    let config = ClientConfig::new_simple(credentials);
    let (mut incoming, client) = Client::new(config);

    client
        .join(channel.to_string())
        .map_err(|e| ChatError::InvalidChannel(format!("{}: {}", channel, e)))?;

    let (tx, rx) = mpsc::channel(queue_size);

    tokio::spawn(async move {
        while let Some(message) = incoming.recv().await {
            let Some(event) = translate(message) else {
                continue;
            };
            if tx.send(event).await.is_err() {
                debug!("Dispatcher gone, stopping chat forwarder");
                break;
            }
        }
        warn!("Twitch message stream closed");
    });

    info!(username = %username, channel = %channel, "Twitch client started");

    Ok((TwitchSender { client }, rx))
}

/// Map a raw server message to a dispatcher event, if it is one we care about.
fn translate(message: ServerMessage) -> Option<ChatEvent> {
    match message {
        // GLOBALUSERSTATE is sent exactly once after a successful login.
        ServerMessage::GlobalUserState(_) => Some(ChatEvent::Connected),
        ServerMessage::Privmsg(msg) => Some(ChatEvent::Message(chat_message(&msg))),
        ServerMessage::Notice(notice) => {
            warn!(
                channel = ?notice.channel_login,
                msg_id = ?notice.message_id,
                text = %notice.message_text,
                "Server notice"
            );
            None
        }
        _ => None,
    }
}

fn chat_message(msg: &PrivmsgMessage) -> ChatMessage {
    ChatMessage {
        channel: msg.channel_login.clone(),
        sender_login: msg.sender.login.clone(),
        sender_display_name: msg.sender.name.clone(),
        is_broadcaster: has_badge(msg, "broadcaster"),
        is_moderator: has_badge(msg, "moderator"),
        text: msg.message_text.clone(),
    }
}

fn has_badge(msg: &PrivmsgMessage, name: &str) -> bool {
    msg.badges.iter().any(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use twitch_irc::message::IRCMessage;

    fn server_message(raw: &str) -> ServerMessage {
        let irc = IRCMessage::parse(raw).unwrap();
        ServerMessage::try_from(irc).unwrap()
    }

    #[test]
    fn test_translate_privmsg_roles() {
        let msg = server_message(
            "@badge-info=;badges=broadcaster/1,subscriber/0;color=#FF0000;display-name=Curi;emotes=;flags=;id=f7b4a1c2-0000-4000-8000-000000000001;mod=0;room-id=2;subscriber=1;tmi-sent-ts=1594545155039;turbo=0;user-id=3;user-type= :curi!curi@curi.tmi.twitch.tv PRIVMSG #curi :!quit",
        );

        let event = translate(msg).unwrap();
        assert_eq!(
            event,
            ChatEvent::Message(ChatMessage {
                channel: "curi".to_string(),
                sender_login: "curi".to_string(),
                sender_display_name: "Curi".to_string(),
                is_broadcaster: true,
                is_moderator: false,
                text: "!quit".to_string(),
            })
        );
    }

    #[test]
    fn test_translate_moderator_badge() {
        let msg = server_message(
            "@badge-info=;badges=moderator/1;color=;display-name=ModBob;emotes=;flags=;id=f7b4a1c2-0000-4000-8000-000000000002;mod=1;room-id=2;subscriber=0;tmi-sent-ts=1594545155039;turbo=0;user-id=4;user-type=mod :modbob!modbob@modbob.tmi.twitch.tv PRIVMSG #curi :!editcmd x y",
        );

        let Some(ChatEvent::Message(message)) = translate(msg) else {
            panic!("expected a message event");
        };
        assert!(message.is_moderator);
        assert!(!message.is_broadcaster);
    }

    #[test]
    fn test_notice_is_not_an_event() {
        let msg = server_message(
            "@msg-id=whisper_restricted :tmi.twitch.tv NOTICE #curi :Your settings prevent you from sending this whisper.",
        );

        assert!(matches!(msg, ServerMessage::Notice(_)));
        assert!(translate(msg).is_none());
    }
}
