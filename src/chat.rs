//! Chat-level data shared by the transport, storage and bot layers.

/// Normalize a channel name: trimmed, lowercase, no leading `#`.
pub fn normalize_channel(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_lowercase()
}

/// Normalize a user key: trimmed, lowercase, no leading `@`.
pub fn normalize_user(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_lowercase()
}

/// The user who sent a chat message. Derived per message, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    /// Login name, lowercase.
    pub username: String,
    pub display_name: Option<String>,
    pub is_mod: bool,
    pub is_broadcaster: bool,
}

impl Sender {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into().to_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn moderator(mut self) -> Self {
        self.is_mod = true;
        self
    }

    /// Display name, or the login when the server sent none.
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// Channel owners are trusted like moderators.
    pub fn is_moderator(&self) -> bool {
        self.is_mod || self.is_broadcaster
    }
}

/// One inbound chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Normalized channel name.
    pub channel: String,
    pub sender: Sender,
    pub text: String,
    /// Sent by the bot account itself.
    pub is_self: bool,
}
