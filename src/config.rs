//! Configuration loading for LurkBot.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the LurkBot home directory (~/.lurkbot).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".lurkbot"))
}

/// Get the default settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from `path`, or from ~/.lurkbot/settings.json when `None`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path()?,
    };

    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.identity.username.trim().is_empty() {
        return Err(Error::Config("identity.username must not be empty".to_string()));
    }
    if settings.prefix.is_empty() {
        return Err(Error::Config("prefix must not be empty".to_string()));
    }
    Ok(())
}

/// Bot account on the chat service.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Identity {
    pub username: String,
    /// OAuth token; `oauth:` is prepended on login if missing.
    pub token: Option<String>,
}

/// Chat server connection.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Server {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// How long JOIN/PART/PING wait for the server to acknowledge.
    #[serde(default = "default_ack_timeout_secs")]
    pub ack_timeout_secs: u64,
}

fn default_server_host() -> String {
    "irc.chat.twitch.tv".to_string()
}

fn default_server_port() -> u16 {
    6667
}

fn default_ack_timeout_secs() -> u64 {
    10
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            ack_timeout_secs: default_ack_timeout_secs(),
        }
    }
}

/// Storage locations. Unset paths resolve under ~/.lurkbot.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Files {
    pub channels: Option<PathBuf>,
    pub prefixes: Option<PathBuf>,
    pub locations: Option<PathBuf>,
    pub accounts_db: Option<PathBuf>,
}

/// Resolved storage locations.
#[derive(Clone, Debug)]
pub struct FilePaths {
    pub channels: PathBuf,
    pub prefixes: PathBuf,
    pub locations: PathBuf,
    pub accounts_db: PathBuf,
}

impl Files {
    pub fn resolve(&self) -> Result<FilePaths> {
        let home = get_home_dir()?;
        Ok(self.resolve_in(&home))
    }

    pub fn resolve_in(&self, base: &Path) -> FilePaths {
        let pick = |p: &Option<PathBuf>, name: &str| {
            p.clone().unwrap_or_else(|| base.join(name))
        };
        FilePaths {
            channels: pick(&self.channels, "channels.txt"),
            prefixes: pick(&self.prefixes, "prefixes.json"),
            locations: pick(&self.locations, "locations.json"),
            accounts_db: pick(&self.accounts_db, "accounts.db"),
        }
    }
}

/// Weather provider (weatherapi.com through RapidAPI).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Weather {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    #[serde(default = "default_weather_host")]
    pub host: String,
    pub api_key: Option<String>,
}

fn default_weather_base_url() -> String {
    "https://weatherapi-com.p.rapidapi.com".to_string()
}

fn default_weather_host() -> String {
    "weatherapi-com.p.rapidapi.com".to_string()
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            host: default_weather_host(),
            api_key: None,
        }
    }
}

fn default_prefix() -> String {
    "*".to_string()
}

fn default_commands_enabled() -> bool {
    true
}

fn default_greeting() -> String {
    "/me FeelsDankMan".to_string()
}

/// LurkBot settings.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default)]
    pub identity: Identity,

    #[serde(default)]
    pub server: Server,

    /// Command prefix used when a channel has no override.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Joined on every start in addition to the persisted list.
    #[serde(default)]
    pub home_channel: Option<String>,

    #[serde(default = "default_commands_enabled")]
    pub commands_enabled: bool,

    /// The only user whose commands still run while commands are disabled.
    #[serde(default)]
    pub super_user: Option<String>,

    /// Sent to a channel right after the `join` command joins it.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    #[serde(default)]
    pub files: Files,

    #[serde(default)]
    pub weather: Weather,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            server: Server::default(),
            prefix: default_prefix(),
            home_channel: None,
            commands_enabled: default_commands_enabled(),
            super_user: None,
            greeting: default_greeting(),
            files: Files::default(),
            weather: Weather::default(),
        }
    }
}
