//! IRCv3 line parsing.
//!
//! `[@tags] [:prefix] COMMAND [params...] [:trailing]`

use std::collections::HashMap;

/// A parsed IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    /// Middle params followed by the trailing param, if any.
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse one line (without CRLF). Returns `None` for empty or
    /// command-less lines.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let mut tags = HashMap::new();
        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = stripped.split_once(' ')?;
            for pair in raw_tags.split(';').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                tags.insert(key.to_string(), unescape_tag_value(value));
            }
            rest = remainder.trim_start();
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (raw_prefix, remainder) = stripped.split_once(' ')?;
            prefix = Some(raw_prefix.to_string());
            rest = remainder.trim_start();
        }

        let (head, trailing) = match rest.find(" :") {
            Some(idx) => (&rest[..idx], Some(&rest[idx + 2..])),
            None => (rest, None),
        };

        let mut words = head.split(' ').filter(|w| !w.is_empty());
        let command = words.next()?.to_uppercase();
        let mut params: Vec<String> = words.map(str::to_string).collect();
        if let Some(trailing) = trailing {
            params.push(trailing.to_string());
        }

        Some(Self {
            tags,
            prefix,
            command,
            params,
        })
    }

    /// Nick part of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        Some(prefix.split('!').next().unwrap_or(prefix))
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn param(&self, idx: usize) -> Option<&str> {
        self.params.get(idx).map(String::as_str)
    }

    /// Last param, which is the trailing text when one was sent.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}

/// Unescape an IRCv3 tag value.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

/// Strip a CTCP ACTION wrapper (`\x01ACTION text\x01`).
pub fn unwrap_action(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("\u{1}ACTION ")?;
    Some(inner.strip_suffix('\u{1}').unwrap_or(inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_privmsg() {
        let line = "@badge-info=;badges=moderator/1;display-name=Some\\sUser;mod=1 :someuser!someuser@someuser.tmi.twitch.tv PRIVMSG #forsen :*ping now\r\n";
        let msg = IrcMessage::parse(line).unwrap();

        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.nick(), Some("someuser"));
        assert_eq!(msg.tag("display-name"), Some("Some User"));
        assert_eq!(msg.tag("mod"), Some("1"));
        assert_eq!(msg.tag("badge-info"), Some(""));
        assert_eq!(msg.param(0), Some("#forsen"));
        assert_eq!(msg.trailing(), Some("*ping now"));
    }

    #[test]
    fn parses_server_ping() {
        let msg = IrcMessage::parse("PING :tmi.twitch.tv").unwrap();
        assert!(msg.prefix.is_none());
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["tmi.twitch.tv"]);
    }

    #[test]
    fn parses_numeric_without_trailing() {
        let msg = IrcMessage::parse(":tmi.twitch.tv 001 lurkbot :Welcome, GLHF!").unwrap();
        assert_eq!(msg.command, "001");
        assert_eq!(msg.params, vec!["lurkbot", "Welcome, GLHF!"]);

        let join = IrcMessage::parse(":lurkbot!lurkbot@lurkbot.tmi.twitch.tv JOIN #xqc").unwrap();
        assert_eq!(join.command, "JOIN");
        assert_eq!(join.params, vec!["#xqc"]);
    }

    #[test]
    fn empty_lines_do_not_parse() {
        assert!(IrcMessage::parse("").is_none());
        assert!(IrcMessage::parse("@a=b").is_none());
    }

    #[test]
    fn unwraps_actions() {
        assert_eq!(unwrap_action("\u{1}ACTION waves\u{1}"), Some("waves"));
        assert_eq!(unwrap_action("plain"), None);
    }
}
