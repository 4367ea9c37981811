// src/session/store.rs — Session collection for one identity
//
// The store owns every session of the current display name, including the
// draft the controller is writing into. Drafts without a finalized message
// are invisible: they are skipped by listings, search and persistence.

use super::storage::{history_key, KeyValueStorage, USERNAME_KEY};
use super::{Message, Session, SessionId};
use crate::infra::errors::ChatError;
use crate::util::now_millis;

/// Width of the "recent" partition.
pub const RECENT_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Ids are millisecond timestamps; anything above `i64::MAX` cannot have
/// been issued and is dropped on load.
const MAX_SESSION_ID: u64 = i64::MAX as u64;

pub struct SessionStore {
    storage: Box<dyn KeyValueStorage>,
    identity: String,
    sessions: Vec<Session>,
    /// Highest id issued or loaded; new ids are always above it.
    last_id: u64,
}

impl SessionStore {
    /// Open the collection of `identity`, loading whatever is persisted.
    pub fn open(storage: Box<dyn KeyValueStorage>, identity: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            identity: identity.into(),
            sessions: Vec::new(),
            last_id: 0,
        };
        store.load();
        store
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn KeyValueStorage {
        self.storage.as_mut()
    }

    /// Allocate a new session. Nothing is persisted until it gains a
    /// finalized message.
    pub fn create_session(&mut self) -> SessionId {
        self.create_session_at(now_millis())
    }

    pub fn create_session_at(&mut self, now: i64) -> SessionId {
        let candidate = u64::try_from(now).unwrap_or(0);
        let id = SessionId::new(candidate.max(self.last_id.saturating_add(1)));
        self.last_id = id.value();
        self.sessions.push(Session::new(id, now));
        id
    }

    /// Append `message` to a session, refreshing `updatedAt` and the preview.
    /// Finalized messages are persisted immediately.
    pub fn append_message(&mut self, id: SessionId, message: Message) -> Result<(), ChatError> {
        let session = self.get_mut(id)?;
        let at = message.timestamp;
        let durable = !message.pending;
        session.messages.push(message);
        session.touch(at);
        if durable {
            self.persist_or_warn();
        }
        Ok(())
    }

    /// Finalize the pending placeholder of `id` with `text`. Returns false
    /// when the session is gone or has no placeholder.
    pub fn replace_pending(&mut self, id: SessionId, text: impl Into<String>) -> bool {
        let now = now_millis();
        let Ok(session) = self.get_mut(id) else {
            return false;
        };
        let Some(idx) = session.pending_index() else {
            return false;
        };
        let msg = &mut session.messages[idx];
        msg.text = text.into();
        msg.pending = false;
        msg.timestamp = msg.timestamp.max(now);
        session.touch(now);
        self.persist_or_warn();
        true
    }

    /// Drop the pending placeholder of `id` without finalizing it.
    pub fn discard_pending(&mut self, id: SessionId) -> bool {
        let Ok(session) = self.get_mut(id) else {
            return false;
        };
        match session.pending_index() {
            Some(idx) => {
                session.messages.remove(idx);
                session.refresh_preview();
                true
            }
            None => false,
        }
    }

    /// Remove a session everywhere. Unknown ids are a no-op.
    pub fn delete_session(&mut self, id: SessionId) {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() != before {
            tracing::debug!("Deleted session {}", id);
            self.persist_or_warn();
        }
    }

    /// Look up any session, drafts included.
    pub fn find_by_id(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Full history, most recently updated first.
    pub fn all_sessions(&self) -> Vec<&Session> {
        let mut listed: Vec<&Session> = self.sessions.iter().filter(|s| s.has_finalized()).collect();
        listed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        listed
    }

    /// Sessions updated less than 24 hours ago.
    pub fn recent_sessions(&self) -> Vec<&Session> {
        self.recent_sessions_at(now_millis())
    }

    pub fn recent_sessions_at(&self, now: i64) -> Vec<&Session> {
        self.all_sessions()
            .into_iter()
            .filter(|s| now.saturating_sub(s.updated_at) < RECENT_WINDOW_MS)
            .collect()
    }

    /// Case-insensitive substring search over previews and message text.
    /// A blank keyword means "no search" and returns the full history.
    pub fn search(&self, keyword: &str) -> Vec<&Session> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return self.all_sessions();
        }
        self.all_sessions()
            .into_iter()
            .filter(|s| s.matches(&needle))
            .collect()
    }

    /// Write every non-empty session of the current identity.
    pub fn persist(&mut self) -> Result<(), ChatError> {
        let durable: Vec<&Session> = self.sessions.iter().filter(|s| s.has_finalized()).collect();
        let json = serde_json::to_string(&durable)?;
        self.storage.set(&history_key(&self.identity), json)
    }

    /// Replace the in-memory collection with the persisted one. Missing or
    /// corrupt data loads as an empty collection.
    pub fn load(&mut self) {
        self.sessions = self.read_persisted();
        if let Some(max) = self.sessions.iter().map(|s| s.id.value()).max() {
            self.last_id = self.last_id.max(max);
        }
    }

    fn read_persisted(&self) -> Vec<Session> {
        let key = history_key(&self.identity);
        let Some(raw) = self.storage.get(&key) else {
            return Vec::new();
        };
        let parsed: Vec<Session> = match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Discarding unreadable history under '{}': {}", key, e);
                return Vec::new();
            }
        };

        let mut sessions: Vec<Session> = Vec::with_capacity(parsed.len());
        for mut session in parsed {
            if session.id.value() > MAX_SESSION_ID {
                tracing::warn!("Skipping out-of-range session id {} in '{}'", session.id, key);
                continue;
            }
            if sessions.iter().any(|s| s.id == session.id) {
                tracing::warn!("Skipping duplicate session id {} in '{}'", session.id, key);
                continue;
            }
            session.refresh_preview();
            sessions.push(session);
        }
        sessions
    }

    /// Persist the current identity, then swap the whole collection for
    /// that of `display_name` and remember it as the active name.
    pub fn switch_identity(&mut self, display_name: &str) -> Result<(), ChatError> {
        if display_name == self.identity {
            return Ok(());
        }
        self.persist_or_warn();
        self.identity = display_name.to_string();
        self.load();
        self.storage.set(USERNAME_KEY, display_name.to_string())
    }

    fn get_mut(&mut self, id: SessionId) -> Result<&mut Session, ChatError> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ChatError::SessionNotFound { id: id.to_string() })
    }

    fn persist_or_warn(&mut self) {
        if let Err(e) = self.persist() {
            tracing::warn!("Failed to persist chat history: {}", e);
        }
    }
}
