//! Joined channels and per-channel prefixes.
//!
//! The in-memory state is authoritative. Join and part are serialized so a
//! membership check, the transport call and the file write for one request
//! never interleave with another request.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::chat::normalize_channel;
use crate::storage::FileStore;
use crate::transport::{Transport, TransportError};

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Already joined #{0}")]
    AlreadyJoined(String),

    #[error("Not joined to #{0}")]
    NotJoined(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Prefix must not be empty")]
    InvalidPrefix,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, ChannelError>;

#[derive(Default)]
struct Channels {
    /// Join order.
    joined: Vec<String>,
    prefixes: HashMap<String, String>,
}

pub struct ChannelState {
    channels: RwLock<Channels>,
    membership: Mutex<()>,
    default_prefix: String,
    /// Joined at startup but never listed, counted or persisted.
    home: Option<String>,
    transport: Arc<dyn Transport>,
    store: FileStore,
}

impl ChannelState {
    /// Build the state with prefix overrides loaded from disk. No channel is
    /// joined until [`ChannelState::restore`] runs.
    pub fn new(
        default_prefix: impl Into<String>,
        transport: Arc<dyn Transport>,
        store: FileStore,
    ) -> Self {
        let prefixes = store.load_prefixes().unwrap_or_else(|e| {
            tracing::warn!("Failed to load prefix overrides: {}, using defaults", e);
            HashMap::new()
        });

        Self {
            channels: RwLock::new(Channels {
                joined: Vec::new(),
                prefixes,
            }),
            membership: Mutex::new(()),
            default_prefix: default_prefix.into(),
            home: None,
            transport,
            store,
        }
    }

    pub fn with_home_channel(mut self, channel: Option<&str>) -> Self {
        self.home = channel
            .map(normalize_channel)
            .filter(|name| !name.is_empty());
        self
    }

    fn is_home(&self, name: &str) -> bool {
        self.home.as_deref() == Some(name)
    }

    /// Joined channels in join order.
    pub async fn list_channels(&self) -> Vec<String> {
        self.channels.read().await.joined.clone()
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.joined.len()
    }

    pub async fn is_joined(&self, channel: &str) -> bool {
        let name = normalize_channel(channel);
        self.channels.read().await.joined.contains(&name)
    }

    /// Override for the channel, else the global default.
    pub async fn effective_prefix(&self, channel: &str) -> String {
        let name = normalize_channel(channel);
        self.channels
            .read()
            .await
            .prefixes
            .get(&name)
            .cloned()
            .unwrap_or_else(|| self.default_prefix.clone())
    }

    /// Join `channel` and persist the new list.
    ///
    /// The channel is added before the transport call and removed again if
    /// the transport rejects it, so nothing rejected is ever persisted.
    pub async fn add_channel(&self, channel: &str) -> Result<()> {
        let name = normalize_channel(channel);
        let _membership = self.membership.lock().await;

        {
            let mut channels = self.channels.write().await;
            if self.is_home(&name) || channels.joined.contains(&name) {
                return Err(ChannelError::AlreadyJoined(name));
            }
            channels.joined.push(name.clone());
        }

        if let Err(e) = self.transport.join(&name).await {
            self.channels.write().await.joined.retain(|c| c != &name);
            return Err(e.into());
        }

        tracing::info!("Joined #{}", name);
        self.persist_channels().await;
        Ok(())
    }

    /// Part `channel` and persist the new list. Transport failures are
    /// logged; the channel is removed locally regardless.
    pub async fn remove_channel(&self, channel: &str) -> Result<()> {
        let name = normalize_channel(channel);
        let _membership = self.membership.lock().await;

        if !self.channels.read().await.joined.contains(&name) {
            return Err(ChannelError::NotJoined(name));
        }

        if let Err(e) = self.transport.part(&name).await {
            tracing::warn!("Failed to part #{}: {}", name, e);
        }

        self.channels.write().await.joined.retain(|c| c != &name);
        tracing::info!("Parted #{}", name);
        self.persist_channels().await;
        Ok(())
    }

    /// Set the prefix override for `channel`. Only moderators may do this.
    pub async fn set_prefix(&self, channel: &str, prefix: &str, requester_is_mod: bool) -> Result<()> {
        if !requester_is_mod {
            return Err(ChannelError::PermissionDenied);
        }
        if prefix.is_empty() {
            return Err(ChannelError::InvalidPrefix);
        }

        let name = normalize_channel(channel);
        let mut channels = self.channels.write().await;
        channels.prefixes.insert(name.clone(), prefix.to_string());
        if let Err(e) = self.store.save_prefixes(&channels.prefixes) {
            tracing::error!("Failed to save prefix overrides: {}", e);
        }
        tracing::info!("Prefix for #{} set to {}", name, prefix);
        Ok(())
    }

    /// Join the home channel, then every saved channel in order, skipping the
    /// ones the transport rejects. Returns how many saved channels were
    /// joined. A saved copy of the home channel is dropped from the list.
    pub async fn restore(&self, channels: &[String]) -> usize {
        let _membership = self.membership.lock().await;
        let mut joined = 0;

        if let Some(home) = &self.home {
            match self.transport.join(home).await {
                Ok(()) => tracing::info!("Joined home channel #{}", home),
                Err(e) => tracing::error!("Failed to join home channel #{}: {}", home, e),
            }
        }

        for channel in channels {
            let name = normalize_channel(channel);
            if name.is_empty() || self.is_home(&name) || self.is_joined(&name).await {
                continue;
            }
            match self.transport.join(&name).await {
                Ok(()) => {
                    self.channels.write().await.joined.push(name.clone());
                    tracing::info!("Joined #{}", name);
                    joined += 1;
                }
                Err(e) => tracing::error!("Failed to join #{}: {}", name, e),
            }
        }

        joined
    }

    async fn persist_channels(&self) {
        let joined = self.list_channels().await;
        if let Err(e) = self.store.save_channels(&joined) {
            tracing::error!("Failed to save channel list: {}", e);
        }
    }
}
