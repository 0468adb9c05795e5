//! Chat transport: connection, membership and outbound messages.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::chat::ChatMessage;

pub mod irc;
pub mod message;

pub use irc::{IrcSettings, IrcTransport};
pub use message::IrcMessage;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Not connected")]
    NotConnected,

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Events pushed by the transport to the bot.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected { address: String, port: u16 },
    Message(ChatMessage),
    Disconnected { reason: String },
}

/// Chat transport capability. Channel names are passed without `#`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self) -> Result<()>;

    /// Join a channel; resolves once the server confirms membership.
    async fn join(&self, channel: &str) -> Result<()>;

    async fn part(&self, channel: &str) -> Result<()>;

    /// Send a chat line. A leading `/me ` is sent as an action.
    async fn say(&self, channel: &str, text: &str) -> Result<()>;

    /// Round-trip latency to the chat server.
    async fn ping(&self) -> Result<Duration>;
}
