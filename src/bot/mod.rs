//! Command bot: dispatch, channel state and command handlers.
//!
//! Data flow for one chat line:
//! - `Dispatcher` resolves the channel prefix and parses the invocation
//! - `commands::run` routes it to a handler
//! - handlers reply through the transport held in `Services`

use std::sync::Arc;

pub mod commands;
pub mod dispatch;
pub mod format;
pub mod locations;
pub mod state;

#[cfg(test)]
pub mod testing;

pub use dispatch::{parse_invocation, Dispatcher, Invocation};
pub use locations::LocationBook;
pub use state::{ChannelError, ChannelState};

use crate::sensors::Sensors;
use crate::storage::AccountStore;
use crate::transport::Transport;
use crate::weather::WeatherProvider;

/// Everything a command handler can reach. Built once at startup.
pub struct Services {
    pub transport: Arc<dyn Transport>,
    pub channels: ChannelState,
    pub locations: LocationBook,
    pub accounts: AccountStore,
    pub weather: Arc<dyn WeatherProvider>,
    pub sensors: Arc<dyn Sensors>,
    /// Sent to a channel right after the `join` command joins it.
    pub greeting: String,
}

impl Services {
    /// Send a chat line, logging instead of failing.
    pub async fn say(&self, channel: &str, text: &str) {
        if let Err(e) = self.transport.say(channel, text).await {
            tracing::error!("Failed to send message to #{}: {}", channel, e);
        }
    }
}
