//! Test doubles for the bot layer.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::chat::{ChatMessage, Sender};
use crate::config::Files;
use crate::sensors::{MemoryUsage, Sensors};
use crate::storage::{AccountStore, FileStore};
use crate::transport::{self, Transport, TransportError};
use crate::weather::{self, ProviderError, WeatherProvider, WeatherResponse};

use super::{ChannelState, Dispatcher, LocationBook, Services};

#[derive(Default)]
pub struct MockTransport {
    said: Mutex<Vec<(String, String)>>,
    joins: Mutex<Vec<String>>,
    parts: Mutex<Vec<String>>,
    rejected: Mutex<HashSet<String>>,
    parts_fail: AtomicBool,
    ping_fails: AtomicBool,
}

impl MockTransport {
    pub async fn said(&self) -> Vec<(String, String)> {
        self.said.lock().await.clone()
    }

    /// Texts sent to one channel.
    pub async fn replies_to(&self, channel: &str) -> Vec<String> {
        self.said
            .lock()
            .await
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub async fn joins(&self) -> Vec<String> {
        self.joins.lock().await.clone()
    }

    pub async fn parts(&self) -> Vec<String> {
        self.parts.lock().await.clone()
    }

    pub async fn reject_join(&self, channel: &str) {
        self.rejected.lock().await.insert(channel.to_string());
    }

    pub fn fail_parts(&self) {
        self.parts_fail.store(true, Ordering::SeqCst);
    }

    pub fn fail_ping(&self) {
        self.ping_fails.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> transport::Result<()> {
        Ok(())
    }

    async fn join(&self, channel: &str) -> transport::Result<()> {
        if self.rejected.lock().await.contains(channel) {
            return Err(TransportError::Rejected(format!("msg_banned: #{}", channel)));
        }
        self.joins.lock().await.push(channel.to_string());
        Ok(())
    }

    async fn part(&self, channel: &str) -> transport::Result<()> {
        if self.parts_fail.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout(format!("PART #{}", channel)));
        }
        self.parts.lock().await.push(channel.to_string());
        Ok(())
    }

    async fn say(&self, channel: &str, text: &str) -> transport::Result<()> {
        self.said
            .lock()
            .await
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }

    async fn ping(&self) -> transport::Result<Duration> {
        if self.ping_fails.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout("PONG".to_string()));
        }
        Ok(Duration::from_millis(42))
    }
}

pub struct FixedSensors {
    pub uptime: Duration,
    pub memory: Option<MemoryUsage>,
    pub temperature: Option<f64>,
}

impl Default for FixedSensors {
    fn default() -> Self {
        Self {
            uptime: Duration::from_secs(3725),
            memory: Some(MemoryUsage {
                resident_bytes: 52_428_800,
                heap_bytes: 1_572_864,
            }),
            temperature: None,
        }
    }
}

impl Sensors for FixedSensors {
    fn uptime(&self) -> Duration {
        self.uptime
    }

    fn memory(&self) -> Option<MemoryUsage> {
        self.memory
    }

    fn cpu_temperature(&self) -> Option<f64> {
        self.temperature
    }
}

/// Returns a canned response, or an API error when none is set.
#[derive(Default)]
pub struct MockWeather {
    response: Mutex<Option<WeatherResponse>>,
    cities: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockWeather {
    pub async fn respond_with(&self, response: WeatherResponse) {
        *self.response.lock().await = Some(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn cities(&self) -> Vec<String> {
        self.cities.lock().await.clone()
    }
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn current(&self, city: &str) -> weather::Result<WeatherResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cities.lock().await.push(city.to_string());
        self.response
            .lock()
            .await
            .clone()
            .ok_or_else(|| ProviderError::Api("503 Service Unavailable".to_string()))
    }
}

/// Services wired to mocks and a temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub transport: Arc<MockTransport>,
    pub weather: Arc<MockWeather>,
    pub services: Arc<Services>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_sensors(FixedSensors::default())
    }

    pub fn with_sensors(sensors: FixedSensors) -> Self {
        let dir = TempDir::new().unwrap();
        let paths = Files::default().resolve_in(dir.path());
        let store = FileStore::new(&paths);
        let transport = Arc::new(MockTransport::default());
        let weather = Arc::new(MockWeather::default());

        let services = Arc::new(Services {
            transport: transport.clone(),
            channels: ChannelState::new("*", transport.clone(), store.clone()),
            locations: LocationBook::new(store),
            accounts: AccountStore::open(&paths.accounts_db).unwrap(),
            weather: weather.clone(),
            sensors: Arc::new(sensors),
            greeting: "/me FeelsDankMan".to_string(),
        });

        Self {
            dir,
            transport,
            weather,
            services,
        }
    }

    pub fn dispatcher(&self, commands_enabled: bool, super_user: Option<String>) -> Dispatcher {
        Dispatcher::new(self.services.clone(), commands_enabled, super_user)
    }

    pub fn message(&self, channel: &str, sender: Sender, text: &str) -> ChatMessage {
        ChatMessage {
            channel: channel.to_string(),
            sender,
            text: text.to_string(),
            is_self: false,
        }
    }

    /// Dispatch `text` in `channel` with commands enabled.
    pub async fn run(&self, channel: &str, sender: Sender, text: &str) {
        self.dispatcher(true, None)
            .dispatch(self.message(channel, sender, text))
            .await;
    }
}
