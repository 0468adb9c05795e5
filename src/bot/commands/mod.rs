//! Chat command handlers.

pub mod info;
pub mod membership;
pub mod prefix;
pub mod profile;
pub mod weather;

use crate::error::Result;

use super::dispatch::Invocation;
use super::Services;

/// Commands the bot answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Prefix,
    Ping,
    Uptime,
    Join,
    Part,
    Channels,
    Weather,
    Temp,
    Set,
    LastFm,
}

impl Command {
    /// Exact match on the lowercase command name.
    pub fn parse(name: &str) -> Option<Self> {
        let command = match name {
            "prefix" => Command::Prefix,
            "ping" => Command::Ping,
            "uptime" => Command::Uptime,
            "join" => Command::Join,
            "part" => Command::Part,
            "channels" => Command::Channels,
            "weather" | "погода" => Command::Weather,
            "temp" => Command::Temp,
            "set" => Command::Set,
            "lastfm" => Command::LastFm,
            _ => return None,
        };
        Some(command)
    }
}

pub async fn run(command: Command, services: &Services, inv: &Invocation) -> Result<()> {
    match command {
        Command::Prefix => prefix::cmd_prefix(services, inv).await,
        Command::Ping => info::cmd_ping(services, inv).await,
        Command::Uptime => info::cmd_uptime(services, inv).await,
        Command::Join => membership::cmd_join(services, inv).await,
        Command::Part => membership::cmd_part(services, inv).await,
        Command::Channels => membership::cmd_channels(services, inv).await,
        Command::Weather => weather::cmd_weather(services, inv, false).await,
        Command::Temp => weather::cmd_weather(services, inv, true).await,
        Command::Set => profile::cmd_set(services, inv).await,
        Command::LastFm => profile::cmd_lastfm(services, inv).await,
    }
}
