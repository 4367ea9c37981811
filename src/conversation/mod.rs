// src/conversation/mod.rs — Conversation controller
//
// Drives one active session through Idle -> AwaitingReply -> Idle. The
// request/response cycle is split in two synchronous halves so a caller can
// keep handling input while a reply is outstanding:
//
//   begin_submit()  appends the user message + placeholder, returns a ticket
//   complete()      applies the relay result to the ticket's placeholder
//
// A ticket is only honoured while its session is still active and it is the
// request the controller is waiting for; anything else is dropped.

pub mod relay_client;

use crate::infra::errors::ChatError;
use crate::session::{Message, Session, SessionId, SessionStore};
use crate::util::now_millis;

pub use relay_client::{HttpRelayClient, RelayClient};

/// Shown in place of a reply whenever the exchange fails.
pub const APOLOGY_TEXT: &str = "Sorry, I couldn't get a response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    AwaitingReply,
}

/// Links an in-flight request to the placeholder it will replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub session: SessionId,
    pub request: u64,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// A reply is still outstanding for the active session; nothing changed.
    Busy,
    Sent(PendingReply),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Applied,
    /// The ticket's session was left or the request superseded.
    Discarded,
}

/// What the sidebar should show.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarListing<'a> {
    Recent(Vec<&'a Session>),
    NoRecent,
    /// Full history, possibly empty.
    History(Vec<&'a Session>),
    SearchResults(Vec<&'a Session>),
    NoResults,
}

/// Rendering surface driven by the controller.
pub trait ChatView {
    fn render_welcome(&mut self, display_name: &str);
    fn render_conversation(&mut self, session: &Session);
    fn render_sidebar(&mut self, listing: &SidebarListing<'_>);
}

/// Default sidebar: sessions from the last 24 hours.
pub fn recent_listing(store: &SessionStore) -> SidebarListing<'_> {
    let recent = store.recent_sessions();
    if recent.is_empty() {
        SidebarListing::NoRecent
    } else {
        SidebarListing::Recent(recent)
    }
}

/// Sidebar for a search box value. A blank keyword means no search is
/// active, which shows the default listing rather than "no results".
pub fn search_listing<'a>(store: &'a SessionStore, keyword: &str) -> SidebarListing<'a> {
    if keyword.trim().is_empty() {
        return recent_listing(store);
    }
    let matches = store.search(keyword);
    if matches.is_empty() {
        SidebarListing::NoResults
    } else {
        SidebarListing::SearchResults(matches)
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    active: Option<SessionId>,
    awaiting: Option<PendingReply>,
    next_request: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active
    }

    pub fn active_session<'a>(&self, store: &'a SessionStore) -> Option<&'a Session> {
        self.active.and_then(|id| store.find_by_id(id))
    }

    pub fn state(&self) -> ControllerState {
        if self.awaiting.is_some() {
            ControllerState::AwaitingReply
        } else {
            ControllerState::Idle
        }
    }

    /// First half of a submission: validate, append the user message and a
    /// placeholder, and hand back the ticket for the request to issue.
    pub fn begin_submit(
        &mut self,
        store: &mut SessionStore,
        view: &mut dyn ChatView,
        text: &str,
    ) -> Result<SubmitOutcome, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        if self.awaiting.is_some() {
            tracing::debug!("Submission ignored: reply still pending");
            return Ok(SubmitOutcome::Busy);
        }

        let id = match self.active.filter(|id| store.find_by_id(*id).is_some()) {
            Some(id) => id,
            None => {
                let id = store.create_session();
                tracing::debug!("Started session {}", id);
                self.active = Some(id);
                id
            }
        };

        let now = now_millis();
        store.append_message(id, Message::user(text, now))?;
        store.append_message(id, Message::placeholder(now))?;

        self.next_request += 1;
        let ticket = PendingReply {
            session: id,
            request: self.next_request,
            prompt: text.to_string(),
        };
        self.awaiting = Some(ticket.clone());

        self.render_active(store, view);
        view.render_sidebar(&recent_listing(store));
        Ok(SubmitOutcome::Sent(ticket))
    }

    /// Second half of a submission: replace the ticket's placeholder with
    /// the reply, or with [`APOLOGY_TEXT`] on failure, then persist.
    pub fn complete(
        &mut self,
        store: &mut SessionStore,
        view: &mut dyn ChatView,
        ticket: &PendingReply,
        result: Result<String, ChatError>,
    ) -> ReplyOutcome {
        let expected = self.awaiting.as_ref().map(|p| p.request);
        if expected != Some(ticket.request) || self.active != Some(ticket.session) {
            tracing::debug!(
                "Discarding stale reply for {} (request {})",
                ticket.session,
                ticket.request
            );
            return ReplyOutcome::Discarded;
        }
        self.awaiting = None;

        let text = match result {
            Ok(reply) => reply,
            Err(e) if e.is_exchange_failure() => {
                tracing::warn!("Chat request failed: {}", e);
                APOLOGY_TEXT.to_string()
            }
            Err(e) => {
                tracing::error!("Unexpected error while waiting for a reply: {}", e);
                APOLOGY_TEXT.to_string()
            }
        };
        if !store.replace_pending(ticket.session, text) {
            tracing::warn!("No placeholder left in {} for reply", ticket.session);
            return ReplyOutcome::Discarded;
        }

        self.render_active(store, view);
        view.render_sidebar(&recent_listing(store));
        ReplyOutcome::Applied
    }

    /// Full submission cycle against `relay`.
    pub async fn submit(
        &mut self,
        store: &mut SessionStore,
        view: &mut dyn ChatView,
        relay: &dyn RelayClient,
        text: &str,
    ) -> Result<SubmitOutcome, ChatError> {
        let outcome = self.begin_submit(store, view, text)?;
        if let SubmitOutcome::Sent(ticket) = &outcome {
            let result = relay.send(&ticket.prompt).await;
            self.complete(store, view, ticket, result);
        }
        Ok(outcome)
    }

    /// Persist the current session and reset to an empty draft.
    pub fn start_new_session(&mut self, store: &mut SessionStore, view: &mut dyn ChatView) {
        self.finalize_active(store);
        view.render_welcome(store.identity());
        view.render_sidebar(&recent_listing(store));
    }

    /// Make a stored session the active one. Returns false for unknown or
    /// empty sessions.
    pub fn open_session(
        &mut self,
        store: &mut SessionStore,
        view: &mut dyn ChatView,
        id: SessionId,
    ) -> bool {
        if !store.find_by_id(id).is_some_and(|s| s.has_finalized()) {
            return false;
        }
        if self.active != Some(id) {
            self.finalize_active(store);
            self.active = Some(id);
        }
        self.render_active(store, view);
        true
    }

    /// Delete any session; deleting the active one resets to the welcome state.
    pub fn delete_session(
        &mut self,
        store: &mut SessionStore,
        view: &mut dyn ChatView,
        id: SessionId,
    ) {
        if self.active == Some(id) {
            self.active = None;
            self.awaiting = None;
            store.delete_session(id);
            view.render_welcome(store.identity());
        } else {
            store.delete_session(id);
        }
        view.render_sidebar(&recent_listing(store));
    }

    pub fn delete_active_session(&mut self, store: &mut SessionStore, view: &mut dyn ChatView) {
        if let Some(id) = self.active {
            self.delete_session(store, view, id);
        }
    }

    pub fn search(&self, store: &SessionStore, view: &mut dyn ChatView, keyword: &str) {
        view.render_sidebar(&search_listing(store, keyword));
    }

    pub fn show_history(&self, store: &SessionStore, view: &mut dyn ChatView) {
        view.render_sidebar(&SidebarListing::History(store.all_sessions()));
    }

    pub fn refresh_sidebar(&self, store: &SessionStore, view: &mut dyn ChatView) {
        view.render_sidebar(&recent_listing(store));
    }

    /// Switch the visible history to another display name.
    pub fn switch_identity(
        &mut self,
        store: &mut SessionStore,
        view: &mut dyn ChatView,
        display_name: &str,
    ) -> Result<(), ChatError> {
        self.finalize_active(store);
        store.switch_identity(display_name)?;
        view.render_welcome(store.identity());
        view.render_sidebar(&recent_listing(store));
        Ok(())
    }

    /// Teardown: drop any placeholder and persist.
    pub fn shutdown(&mut self, store: &mut SessionStore) {
        self.finalize_active(store);
        if let Err(e) = store.persist() {
            tracing::warn!("Failed to persist chat history on exit: {}", e);
        }
    }

    /// Leave the active session: an outstanding reply is abandoned, empty
    /// drafts are dropped, anything else is written out.
    fn finalize_active(&mut self, store: &mut SessionStore) {
        let Some(id) = self.active.take() else {
            return;
        };
        if self.awaiting.take().is_some() {
            store.discard_pending(id);
        }
        match store.find_by_id(id).map(|s| s.has_finalized()) {
            Some(true) => {
                if let Err(e) = store.persist() {
                    tracing::warn!("Failed to persist session {}: {}", id, e);
                }
            }
            Some(false) => store.delete_session(id),
            None => {}
        }
    }

    fn render_active(&self, store: &SessionStore, view: &mut dyn ChatView) {
        match self.active_session(store) {
            Some(session) => view.render_conversation(session),
            None => view.render_welcome(store.identity()),
        }
    }
}
