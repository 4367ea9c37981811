// src/session/mod.rs — Chat sessions and their persistence

pub mod profile;
pub mod storage;
pub mod store;

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::util::ellipsize;

pub use profile::Profile;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::SessionStore;

/// Maximum number of characters kept in a session preview.
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Text shown in a placeholder while a reply is outstanding.
pub const PENDING_TEXT: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: i64,
    /// Placeholder awaiting a reply. Never written to storage.
    #[serde(skip)]
    pub pending: bool,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp,
            pending: false,
        }
    }

    pub fn assistant(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            timestamp,
            pending: false,
        }
    }

    pub fn placeholder(timestamp: i64) -> Self {
        Self {
            sender: Sender::Assistant,
            text: PENDING_TEXT.into(),
            timestamp,
            pending: true,
        }
    }
}

/// Opaque session identifier, rendered as `chat_<n>`. Larger `n` means
/// created later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat_{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("chat_").unwrap_or(s);
        digits
            .parse::<u64>()
            .map(SessionId)
            .map_err(|_| format!("invalid session id '{s}'"))
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    #[serde(serialize_with = "serialize_finalized")]
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub preview: String,
}

fn serialize_finalized<S: Serializer>(messages: &[Message], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(messages.iter().filter(|m| !m.pending))
}

impl Session {
    pub fn new(id: SessionId, now: i64) -> Self {
        Self {
            id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            preview: String::new(),
        }
    }

    /// Whether the session holds at least one finalized message, i.e.
    /// whether it belongs in listings and storage.
    pub fn has_finalized(&self) -> bool {
        self.messages.iter().any(|m| !m.pending)
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.messages.iter().position(|m| m.pending)
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.pending_index().is_some()
    }

    /// Case-insensitive substring match on the preview and every message.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.preview.to_lowercase().contains(needle)
            || self
                .messages
                .iter()
                .filter(|m| !m.pending)
                .any(|m| m.text.to_lowercase().contains(needle))
    }

    /// Record a mutation at `at`. `updated_at` never moves backwards.
    pub(crate) fn touch(&mut self, at: i64) {
        self.updated_at = self.updated_at.max(at);
        self.refresh_preview();
    }

    pub(crate) fn refresh_preview(&mut self) {
        self.preview = self
            .messages
            .iter()
            .filter(|m| !m.pending)
            .find(|m| !m.text.trim().is_empty())
            .map(|m| ellipsize(&m.text, PREVIEW_MAX_CHARS))
            .unwrap_or_default();
    }
}
