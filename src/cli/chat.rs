// src/cli/chat.rs — Interactive REPL against the relay

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::view::TerminalView;
use crate::conversation::{
    ChatView, Conversation, HttpRelayClient, PendingReply, RelayClient, SubmitOutcome,
};
use crate::infra::config::Config;
use crate::infra::errors::ChatError;
use crate::session::profile::{self, Profile};
use crate::session::{FileStorage, SessionId, SessionStore};

type ReplyFuture = Pin<Box<dyn Future<Output = Result<String, ChatError>> + Send>>;

/// The one request allowed in flight, together with its ticket.
struct InFlight {
    ticket: PendingReply,
    reply: ReplyFuture,
}

/// Everything a slash command may touch.
struct ChatSession<W: std::io::Write> {
    store: SessionStore,
    conversation: Conversation,
    view: TerminalView<W>,
    profile: Profile,
}

/// Open the store of the active display name from the configured storage file.
pub fn open_store(config: &Config) -> (SessionStore, Profile) {
    let storage = FileStorage::open(config.client.storage_path());
    let profile = Profile::load(&storage);
    tracing::debug!("Using storage at {}", storage.path().display());
    let store = SessionStore::open(Box::new(storage), profile.display_name.clone());
    (store, profile)
}

/// Run the interactive chat REPL.
pub async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let (store, profile) = open_store(config);
    let relay: Arc<dyn RelayClient> = Arc::new(HttpRelayClient::from_config(&config.client));

    eprintln!(
        "chatmosphere v{} | relay: {} | {} saved chat(s) for {}\n",
        env!("CARGO_PKG_VERSION"),
        config.client.relay_url,
        store.all_sessions().len(),
        profile.display_name,
    );

    let mut chat = ChatSession {
        view: TerminalView::stdout(&profile.display_name),
        conversation: Conversation::new(),
        store,
        profile,
    };
    chat.view.render_welcome(chat.store.identity());
    chat.conversation.refresh_sidebar(&chat.store, &mut chat.view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<InFlight> = None;

    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let input = match line {
                    Ok(Some(input)) => input,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Failed to read input: {}", e);
                        break;
                    }
                };
                let trimmed = input.trim();

                if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
                    break;
                }

                if trimmed.starts_with('/') {
                    handle_slash_command(trimmed, &mut chat);
                    continue;
                }

                match chat
                    .conversation
                    .begin_submit(&mut chat.store, &mut chat.view, trimmed)?
                {
                    SubmitOutcome::Sent(ticket) => {
                        let relay = relay.clone();
                        let message = ticket.prompt.clone();
                        in_flight = Some(InFlight {
                            ticket,
                            reply: Box::pin(async move { relay.send(&message).await }),
                        });
                    }
                    SubmitOutcome::Busy => eprintln!("  Still waiting for the last reply."),
                    SubmitOutcome::Ignored => {}
                }
            }
            Some((ticket, result)) = next_reply(&mut in_flight) => {
                chat.conversation
                    .complete(&mut chat.store, &mut chat.view, &ticket, result);
            }
        }
    }

    chat.conversation.shutdown(&mut chat.store);
    eprintln!("\nSaved {} chat(s).", chat.store.all_sessions().len());
    Ok(())
}

/// Resolve the in-flight reply, or never resolve when nothing is in flight.
async fn next_reply(
    slot: &mut Option<InFlight>,
) -> Option<(PendingReply, Result<String, ChatError>)> {
    let result = match slot.as_mut() {
        Some(pending) => (&mut pending.reply).await,
        None => return std::future::pending().await,
    };
    slot.take().map(|done| (done.ticket, result))
}

fn prompt() {
    use std::io::Write;
    print!("> ");
    std::io::stdout().flush().ok();
}

fn handle_slash_command<W: std::io::Write>(input: &str, chat: &mut ChatSession<W>) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");
    let ChatSession {
        store,
        conversation,
        view,
        profile,
    } = chat;

    match cmd {
        "/new" => conversation.start_new_session(store, view),

        "/recent" => conversation.refresh_sidebar(store, view),

        "/history" => conversation.show_history(store, view),

        "/search" => conversation.search(store, view, arg),

        "/open" => match arg.parse::<SessionId>() {
            Ok(id) => {
                if !conversation.open_session(store, view, id) {
                    eprintln!("  No chat with id {arg}");
                }
            }
            Err(e) => eprintln!("  {e}. Usage: /open <chat id>"),
        },

        "/delete" => {
            if arg.is_empty() {
                if conversation.active_id().is_none() {
                    eprintln!("  No active chat. Usage: /delete [chat id]");
                } else {
                    conversation.delete_active_session(store, view);
                    eprintln!("  Conversation deleted.");
                }
            } else {
                match arg.parse::<SessionId>() {
                    Ok(id) if store.find_by_id(id).is_none() => {
                        eprintln!("  No chat with id {id}; nothing to delete.");
                    }
                    Ok(id) => {
                        conversation.delete_session(store, view, id);
                        eprintln!("  Deleted {id}");
                    }
                    Err(e) => eprintln!("  {e}"),
                }
            }
        }

        "/name" => {
            if arg.is_empty() {
                eprintln!("  Display name: {}", store.identity());
                eprintln!("  Usage: /name <display name>");
            } else {
                match conversation.switch_identity(store, view, arg) {
                    Ok(()) => profile.display_name = arg.to_string(),
                    Err(e) => eprintln!("  Could not switch name: {e}"),
                }
            }
        }

        "/avatar" => {
            let avatar = if arg.is_empty() || arg == "none" {
                None
            } else {
                Some(arg.to_string())
            };
            match profile.set_avatar(store.storage_mut(), avatar) {
                Ok(()) => match &profile.avatar {
                    Some(a) => eprintln!("  Avatar set to {a}"),
                    None => eprintln!("  Avatar cleared"),
                },
                Err(e) => eprintln!("  Could not save avatar: {e}"),
            }
        }

        "/sidebar" => {
            let collapsed = !profile::sidebar_collapsed(store.storage());
            match profile::set_sidebar_collapsed(store.storage_mut(), collapsed) {
                Ok(()) if collapsed => eprintln!("  Sidebar collapsed"),
                Ok(()) => {
                    eprintln!("  Sidebar expanded");
                    conversation.refresh_sidebar(store, view);
                }
                Err(e) => eprintln!("  Could not save sidebar state: {e}"),
            }
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /new               Save this chat and start a new one");
            eprintln!("  /recent            Show chats from the last 24 hours");
            eprintln!("  /history           Show all saved chats");
            eprintln!("  /search <text>     Search saved chats");
            eprintln!("  /open <id>         Continue a saved chat");
            eprintln!("  /delete [id]       Delete a chat (default: the current one)");
            eprintln!("  /name [name]       Show or switch display name");
            eprintln!("  /avatar [uri]      Set or clear the avatar");
            eprintln!("  /sidebar           Toggle the sidebar listing");
            eprintln!("  /help              Show this help");
            eprintln!("  /quit, quit, exit  Save and leave");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}
