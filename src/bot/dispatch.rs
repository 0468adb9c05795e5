//! Inbound message dispatch.

use std::sync::Arc;

use crate::chat::{ChatMessage, Sender};

use super::commands::{self, Command};
use super::Services;

/// One parsed command. Only built when the text starts with the channel's
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub channel: String,
    pub sender: Sender,
    /// Lowercase command name.
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `msg` against `prefix`. The prefix match is exact and
/// case-sensitive.
pub fn parse_invocation(prefix: &str, msg: &ChatMessage) -> Option<Invocation> {
    let body = msg.text.strip_prefix(prefix)?;
    let mut words = body.split_whitespace();
    let name = words.next()?.to_lowercase();

    Some(Invocation {
        channel: msg.channel.clone(),
        sender: msg.sender.clone(),
        name,
        args: words.map(str::to_string).collect(),
    })
}

#[derive(Clone)]
pub struct Dispatcher {
    services: Arc<Services>,
    commands_enabled: bool,
    super_user: Option<String>,
}

impl Dispatcher {
    pub fn new(services: Arc<Services>, commands_enabled: bool, super_user: Option<String>) -> Self {
        Self {
            services,
            commands_enabled,
            super_user: super_user.map(|u| u.to_lowercase()),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// While commands are disabled only the super-user gets through.
    fn allows(&self, sender: &Sender) -> bool {
        if self.commands_enabled {
            return true;
        }
        match &self.super_user {
            Some(user) => sender.username.to_lowercase() == *user,
            None => false,
        }
    }

    /// Handle one inbound message. Never fails; handler errors are logged.
    pub async fn dispatch(&self, msg: ChatMessage) {
        if msg.is_self {
            return;
        }

        tracing::debug!("[{}] {}: {}", msg.channel, msg.sender.name(), msg.text);

        let prefix = self.services.channels.effective_prefix(&msg.channel).await;
        let Some(invocation) = parse_invocation(&prefix, &msg) else {
            return;
        };

        if !self.allows(&invocation.sender) {
            tracing::debug!(
                "Commands disabled, ignoring {} from {}",
                invocation.name,
                invocation.sender.username
            );
            return;
        }

        let Some(command) = Command::parse(&invocation.name) else {
            tracing::debug!("Unknown command: {}", invocation.name);
            return;
        };

        if let Err(e) = commands::run(command, &self.services, &invocation).await {
            tracing::warn!("Command {} in #{} failed: {}", invocation.name, invocation.channel, e);
        }
    }
}
