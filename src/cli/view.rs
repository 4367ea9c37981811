// src/cli/view.rs — Terminal rendering of conversations and the sidebar

use chrono::{DateTime, Local, TimeZone};
use std::io::Write;

use crate::conversation::{ChatView, SidebarListing};
use crate::session::{Sender, Session};

/// Name shown for assistant messages.
pub const ASSISTANT_NAME: &str = "Chátmosphere";

/// `Today, 14:05` for timestamps on the current local day, otherwise
/// `2026-10-14 09:30`.
pub fn format_time(ts_millis: i64, now: DateTime<Local>) -> String {
    let Some(when) = Local.timestamp_millis_opt(ts_millis).single() else {
        return "unknown time".into();
    };
    if when.date_naive() == now.date_naive() {
        format!("Today, {}", when.format("%H:%M"))
    } else {
        when.format("%Y-%m-%d %H:%M").to_string()
    }
}

pub struct TerminalView<W: Write> {
    out: W,
    display_name: String,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout(display_name: &str) -> Self {
        Self::new(std::io::stdout(), display_name)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, display_name: &str) -> Self {
        Self {
            out,
            display_name: display_name.to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        // A closed stdout is not worth aborting the session over.
        let _ = writeln!(self.out, "{line}");
    }

    fn write_entries(&mut self, sessions: &[&Session]) {
        let now = Local::now();
        for s in sessions {
            let line = format!(
                "  {:<20} {:<53} {}",
                s.id.to_string(),
                s.preview,
                format_time(s.updated_at, now)
            );
            self.write_line(line.trim_end());
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn render_welcome(&mut self, display_name: &str) {
        self.display_name = display_name.to_string();
        self.write_line(&format!("Hello, {display_name}"));
        self.write_line(&format!(
            "Welcome to {ASSISTANT_NAME}, how can we help you today?"
        ));
    }

    fn render_conversation(&mut self, session: &Session) {
        self.write_line(&format!("── {} ──", session.id));
        for m in &session.messages {
            let who = match m.sender {
                Sender::User => self.display_name.clone(),
                Sender::Assistant => ASSISTANT_NAME.to_string(),
            };
            self.write_line(&format!("{who}: {}", m.text));
        }
        let _ = self.out.flush();
    }

    fn render_sidebar(&mut self, listing: &SidebarListing<'_>) {
        match listing {
            SidebarListing::Recent(sessions) => {
                self.write_line("Recent chats:");
                self.write_entries(sessions);
            }
            SidebarListing::NoRecent => self.write_line("No recent chats"),
            SidebarListing::History(sessions) if sessions.is_empty() => {
                self.write_line("No saved chats")
            }
            SidebarListing::History(sessions) => {
                self.write_line("History:");
                self.write_entries(sessions);
            }
            SidebarListing::SearchResults(sessions) => {
                self.write_line("Search results:");
                self.write_entries(sessions);
            }
            SidebarListing::NoResults => self.write_line("No matching chats"),
        }
        let _ = self.out.flush();
    }
}
