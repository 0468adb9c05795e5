//! CLI commands for LurkBot using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bot::{ChannelState, Dispatcher, LocationBook, Services};
use crate::config::load_settings;
use crate::sensors::SystemSensors;
use crate::storage::{AccountStore, FileStore};
use crate::transport::{IrcSettings, IrcTransport, Transport, TransportEvent};
use crate::weather::WeatherApiClient;

/// LurkBot - Twitch chat command bot.
#[derive(Parser)]
#[command(name = "lurkbot")]
#[command(version)]
#[command(about = "LurkBot - Twitch chat command bot", long_about = None)]
pub struct Commands {
    /// Settings file (default: ~/.lurkbot/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log directory (default: the per-user data dir)
    #[arg(long, global = true, env = "LURKBOT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to chat and answer commands
    Run {
        /// OAuth token, overrides identity.token from the settings file
        #[arg(long, env = "LURKBOT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Print the persisted channel list
    Channels,

    /// Inspect or edit linked Last.fm accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),

    /// Print saved user locations
    Locations,
}

#[derive(Subcommand)]
pub enum AccountsCommand {
    /// List every linked account
    List,

    /// Link a chat user to a Last.fm account
    Set {
        /// Chat username
        username: String,
        /// Last.fm account name
        account: String,
    },
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        let config = self.config.as_deref();
        match &self.command {
            Command::Run { token } => cmd_run(config, token.clone()).await,
            Command::Channels => cmd_channels(config),
            Command::Accounts(cmd) => cmd_accounts(config, cmd),
            Command::Locations => cmd_locations(config),
        }
    }
}

// Command implementations

async fn cmd_run(config: Option<&Path>, token: Option<String>) -> Result<()> {
    let mut settings = load_settings(config)?;
    if token.is_some() {
        settings.identity.token = token;
    }

    let paths = settings.files.resolve()?;
    let store = FileStore::new(&paths);

    let (transport, mut events) = IrcTransport::new(IrcSettings::from_settings(&settings));
    let transport: Arc<dyn Transport> = Arc::new(transport);

    let services = Arc::new(Services {
        transport: transport.clone(),
        channels: ChannelState::new(&settings.prefix, transport.clone(), store.clone())
            .with_home_channel(settings.home_channel.as_deref()),
        locations: LocationBook::new(store.clone()),
        accounts: AccountStore::open(&paths.accounts_db)?,
        weather: Arc::new(WeatherApiClient::new(&settings.weather)),
        sensors: Arc::new(SystemSensors::new()),
        greeting: settings.greeting.clone(),
    });
    let dispatcher = Dispatcher::new(
        services,
        settings.commands_enabled,
        settings.super_user.clone(),
    );

    transport.connect().await?;

    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Connected { address, port } => {
                tracing::info!("Connected to {}:{}", address, port);
                let channels = saved_channels(&store);
                let services = dispatcher.services().clone();
                // Join acks arrive through this loop, so restore elsewhere.
                tokio::spawn(async move {
                    let joined = services.channels.restore(&channels).await;
                    tracing::info!("Joined {} of {} channels", joined, channels.len());
                });
            }
            TransportEvent::Message(msg) => {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    dispatcher.dispatch(msg).await;
                });
            }
            TransportEvent::Disconnected { reason } => {
                return Err(anyhow::anyhow!("Disconnected from chat: {}", reason));
            }
        }
    }

    Err(anyhow::anyhow!("Transport event stream closed"))
}

fn saved_channels(store: &FileStore) -> Vec<String> {
    store.load_channels().unwrap_or_else(|e| {
        tracing::error!("Failed to load channel list: {}", e);
        Vec::new()
    })
}

fn cmd_channels(config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let store = FileStore::new(&settings.files.resolve()?);
    let channels = store.load_channels()?;

    if channels.is_empty() {
        println!("No channels saved.");
        return Ok(());
    }
    println!("Channels ({}):", channels.len());
    for channel in channels {
        println!("  #{}", channel);
    }
    Ok(())
}

fn cmd_accounts(config: Option<&Path>, cmd: &AccountsCommand) -> Result<()> {
    let settings = load_settings(config)?;
    let paths = settings.files.resolve()?;
    let accounts = AccountStore::open(&paths.accounts_db)?;

    match cmd {
        AccountsCommand::List => {
            let all: BTreeMap<_, _> = accounts.load_all()?.into_iter().collect();
            if all.is_empty() {
                println!("No linked accounts.");
            }
            for (username, account) in all {
                println!("{} -> {}", username, account);
            }
        }
        AccountsCommand::Set { username, account } => {
            let username = crate::chat::normalize_user(username);
            accounts.save(&username, account)?;
            println!("Linked {} to Last.fm account {}", username, account);
        }
    }
    Ok(())
}

fn cmd_locations(config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let store = FileStore::new(&settings.files.resolve()?);
    let locations: BTreeMap<_, _> = store.load_locations()?.into_iter().collect();

    if locations.is_empty() {
        println!("No locations saved.");
    }
    for (user, record) in locations {
        println!("{}: {}", user, record.city);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Files;
    use tempfile::TempDir;

    #[test]
    fn parses_global_config_and_accounts_set() {
        let cli = Commands::try_parse_from([
            "lurkbot",
            "accounts",
            "set",
            "Viewer",
            "viewer_fm",
            "--config",
            "/tmp/lurkbot.json",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/lurkbot.json")));
        match cli.command {
            Command::Accounts(AccountsCommand::Set { username, account }) => {
                assert_eq!(username, "Viewer");
                assert_eq!(account, "viewer_fm");
            }
            _ => panic!("expected accounts set"),
        }
    }

    #[test]
    fn run_accepts_token_flag() {
        let cli = Commands::try_parse_from(["lurkbot", "run", "--token", "abc"]).unwrap();
        match cli.command {
            Command::Run { token } => assert_eq!(token.as_deref(), Some("abc")),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn saved_channels_default_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(&Files::default().resolve_in(dir.path()));
        assert!(saved_channels(&store).is_empty());

        store
            .save_channels(&["forsen".to_string(), "xqc".to_string()])
            .unwrap();
        assert_eq!(saved_channels(&store), vec!["forsen", "xqc"]);
    }
}
