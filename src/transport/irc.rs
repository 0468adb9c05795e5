//! Twitch chat over plain IRC.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::codec::{AnyDelimiterCodec, Framed};

use crate::chat::{normalize_channel, ChatMessage, Sender};
use crate::config::Settings;

use super::message::{unwrap_action, IrcMessage};
use super::{Result, Transport, TransportError, TransportEvent};

/// Longer lines are dropped by the reader.
const MAX_LINE_LENGTH: usize = 8192;

type Ack = oneshot::Sender<std::result::Result<(), String>>;
type Outbound = Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>;

/// Connection parameters for [`IrcTransport`].
#[derive(Clone, Debug)]
pub struct IrcSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub token: Option<String>,
    pub ack_timeout: Duration,
}

impl IrcSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            username: settings.identity.username.to_lowercase(),
            token: settings.identity.token.clone(),
            ack_timeout: Duration::from_secs(settings.server.ack_timeout_secs),
        }
    }
}

/// Requests waiting for the server to answer.
#[derive(Default)]
struct Pending {
    joins: Mutex<HashMap<String, Ack>>,
    parts: Mutex<HashMap<String, Ack>>,
    pings: Mutex<HashMap<String, oneshot::Sender<()>>>,
}

pub struct IrcTransport {
    settings: IrcSettings,
    events: mpsc::Sender<TransportEvent>,
    outbound: Outbound,
    pending: Arc<Pending>,
    ping_counter: AtomicU64,
}

impl IrcTransport {
    /// Create the transport and the receiver its events are delivered on.
    pub fn new(settings: IrcSettings) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (events, rx) = mpsc::channel(256);
        let transport = Self {
            settings,
            events,
            outbound: Arc::new(Mutex::new(None)),
            pending: Arc::new(Pending::default()),
            ping_counter: AtomicU64::new(0),
        };
        (transport, rx)
    }

    async fn send_line(&self, line: String) -> Result<()> {
        let outbound = self.outbound.lock().await;
        let tx = outbound.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(line).map_err(|_| TransportError::Closed)
    }

    async fn await_ack(
        &self,
        waiters: &Mutex<HashMap<String, Ack>>,
        channel: &str,
        line: String,
        what: &str,
    ) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        waiters.lock().await.insert(channel.to_string(), tx);

        if let Err(e) = self.send_line(line).await {
            waiters.lock().await.remove(channel);
            return Err(e);
        }

        match tokio::time::timeout(self.settings.ack_timeout, rx).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(reason))) => Err(TransportError::Rejected(reason)),
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => {
                waiters.lock().await.remove(channel);
                Err(TransportError::Timeout(format!("{} #{}", what, channel)))
            }
        }
    }
}

#[async_trait]
impl Transport for IrcTransport {
    async fn connect(&self) -> Result<()> {
        let address = (self.settings.host.as_str(), self.settings.port);
        let stream = TcpStream::connect(address).await?;
        // Split on LF, write CRLF. Lines stay raw bytes until `decode_line`.
        let framed = Framed::new(stream, AnyDelimiterCodec::new(b"\n".to_vec(), b"\r\n".to_vec()));
        let (mut sink, mut lines) = framed.split();

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if let Err(e) = sink.send(line).await {
                    tracing::warn!("IRC write failed: {}", e);
                    break;
                }
            }
        });

        tx.send("CAP REQ :twitch.tv/tags twitch.tv/commands".to_string())
            .map_err(|_| TransportError::Closed)?;
        if let Some(token) = &self.settings.token {
            let token = if token.starts_with("oauth:") {
                token.clone()
            } else {
                format!("oauth:{}", token)
            };
            tx.send(format!("PASS {}", token))
                .map_err(|_| TransportError::Closed)?;
        }
        tx.send(format!("NICK {}", self.settings.username))
            .map_err(|_| TransportError::Closed)?;

        *self.outbound.lock().await = Some(tx);

        let reader = Reader {
            settings: self.settings.clone(),
            events: self.events.clone(),
            outbound: self.outbound.clone(),
            pending: self.pending.clone(),
        };
        tokio::spawn(async move {
            let reason = loop {
                match lines.next().await {
                    Some(Ok(raw)) => {
                        let Some(line) = decode_line(&raw) else {
                            continue;
                        };
                        if let Some(msg) = IrcMessage::parse(&line) {
                            reader.handle(msg).await;
                        }
                    }
                    Some(Err(e)) => break format!("read error: {}", e),
                    None => break "connection closed by server".to_string(),
                }
            };
            reader.outbound.lock().await.take();
            tracing::warn!("IRC connection ended: {}", reason);
            let _ = reader
                .events
                .send(TransportEvent::Disconnected { reason })
                .await;
        });

        tracing::info!(
            "Connecting to {}:{} as {}",
            self.settings.host,
            self.settings.port,
            self.settings.username
        );
        Ok(())
    }

    async fn join(&self, channel: &str) -> Result<()> {
        let name = normalize_channel(channel);
        let line = format!("JOIN #{}", name);
        self.await_ack(&self.pending.joins, &name, line, "JOIN").await
    }

    async fn part(&self, channel: &str) -> Result<()> {
        let name = normalize_channel(channel);
        let line = format!("PART #{}", name);
        self.await_ack(&self.pending.parts, &name, line, "PART").await
    }

    async fn say(&self, channel: &str, text: &str) -> Result<()> {
        let name = normalize_channel(channel);
        let text = text.replace(['\r', '\n'], " ");
        let line = match text.strip_prefix("/me ") {
            Some(action) => format!("PRIVMSG #{} :\u{1}ACTION {}\u{1}", name, action),
            None => format!("PRIVMSG #{} :{}", name, text),
        };
        self.send_line(line).await
    }

    async fn ping(&self) -> Result<Duration> {
        let token = format!(
            "lurkbot-{}",
            self.ping_counter.fetch_add(1, Ordering::Relaxed)
        );
        let (tx, rx) = oneshot::channel();
        self.pending.pings.lock().await.insert(token.clone(), tx);

        let started = Instant::now();
        if let Err(e) = self.send_line(format!("PING :{}", token)).await {
            self.pending.pings.lock().await.remove(&token);
            return Err(e);
        }

        match tokio::time::timeout(self.settings.ack_timeout, rx).await {
            Ok(Ok(())) => Ok(started.elapsed()),
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => {
                self.pending.pings.lock().await.remove(&token);
                Err(TransportError::Timeout("PONG".to_string()))
            }
        }
    }
}

/// State owned by the read loop.
struct Reader {
    settings: IrcSettings,
    events: mpsc::Sender<TransportEvent>,
    outbound: Outbound,
    pending: Arc<Pending>,
}

impl Reader {
    async fn reply(&self, line: String) {
        if let Some(tx) = self.outbound.lock().await.as_ref() {
            let _ = tx.send(line);
        }
    }

    async fn handle(&self, msg: IrcMessage) {
        match msg.command.as_str() {
            "PING" => {
                let token = msg.trailing().unwrap_or("tmi.twitch.tv");
                self.reply(format!("PONG :{}", token)).await;
            }
            "PONG" => {
                if let Some(token) = msg.trailing() {
                    if let Some(tx) = self.pending.pings.lock().await.remove(token) {
                        let _ = tx.send(());
                    }
                }
            }
            "001" => {
                let _ = self
                    .events
                    .send(TransportEvent::Connected {
                        address: self.settings.host.clone(),
                        port: self.settings.port,
                    })
                    .await;
            }
            "JOIN" | "PART" if msg.nick() == Some(self.settings.username.as_str()) => {
                let Some(channel) = msg.param(0).map(normalize_channel) else {
                    return;
                };
                let waiters = if msg.command == "JOIN" {
                    &self.pending.joins
                } else {
                    &self.pending.parts
                };
                if let Some(tx) = waiters.lock().await.remove(&channel) {
                    let _ = tx.send(Ok(()));
                }
            }
            "NOTICE" => self.handle_notice(&msg).await,
            "PRIVMSG" => {
                if let Some(chat) = chat_message_from(&msg, &self.settings.username) {
                    let _ = self.events.send(TransportEvent::Message(chat)).await;
                }
            }
            "RECONNECT" => {
                tracing::warn!("Server requested a reconnect");
            }
            _ => {}
        }
    }

    async fn handle_notice(&self, msg: &IrcMessage) {
        let text = msg.trailing().unwrap_or_default();
        let target = msg.param(0).unwrap_or("*");

        if target == "*" {
            if text.contains("authentication failed") || text.contains("Improperly formatted auth") {
                tracing::error!("Login rejected: {}", text);
            } else {
                tracing::info!("Server notice: {}", text);
            }
            return;
        }

        let channel = normalize_channel(target);
        if let Some(msg_id) = msg.tag("msg-id") {
            if let Some(tx) = self.pending.joins.lock().await.remove(&channel) {
                let _ = tx.send(Err(format!("{}: {}", msg_id, text)));
                return;
            }
        }
        tracing::debug!("[{}] notice: {}", channel, text);
    }
}

/// Decode one raw line. Invalid UTF-8 is replaced; oversize lines are
/// dropped.
fn decode_line(raw: &[u8]) -> Option<String> {
    if raw.len() > MAX_LINE_LENGTH {
        tracing::warn!("Dropping {} byte line from server", raw.len());
        return None;
    }
    Some(String::from_utf8_lossy(raw).into_owned())
}

/// Build a chat message from a PRIVMSG line.
pub fn chat_message_from(msg: &IrcMessage, bot_username: &str) -> Option<ChatMessage> {
    let channel = normalize_channel(msg.param(0)?);
    let raw_text = msg.param(1)?;
    let username = msg.nick()?.to_lowercase();

    let sender = Sender {
        display_name: msg
            .tag("display-name")
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        is_mod: msg.tag("mod") == Some("1"),
        is_broadcaster: msg
            .tag("badges")
            .map(|b| b.split(',').any(|badge| badge.starts_with("broadcaster/")))
            .unwrap_or(false),
        username,
    };

    Some(ChatMessage {
        channel,
        is_self: sender.username == bot_username.to_lowercase(),
        sender,
        text: unwrap_action(raw_text).unwrap_or(raw_text).to_string(),
    })
}
