// src/cli/history.rs — One-shot history, search, delete and profile commands

use super::chat::open_store;
use super::view::TerminalView;
use crate::conversation::{recent_listing, search_listing, ChatView, SidebarListing};
use crate::infra::config::Config;
use crate::session::SessionId;

/// `chatmosphere history [--all]`
pub fn run_history(config: &Config, all: bool) -> anyhow::Result<()> {
    let (store, profile) = open_store(config);
    let mut view = TerminalView::stdout(&profile.display_name);
    if all {
        view.render_sidebar(&SidebarListing::History(store.all_sessions()));
    } else {
        view.render_sidebar(&recent_listing(&store));
    }
    Ok(())
}

/// `chatmosphere search <keyword>`
pub fn run_search(config: &Config, keyword: &str) -> anyhow::Result<()> {
    let (store, profile) = open_store(config);
    let mut view = TerminalView::stdout(&profile.display_name);
    view.render_sidebar(&search_listing(&store, keyword));
    Ok(())
}

/// `chatmosphere show <id>`
pub fn run_show(config: &Config, id: &str) -> anyhow::Result<()> {
    let id: SessionId = id.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let (store, profile) = open_store(config);
    let session = store
        .find_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("No chat with id {id}"))?;
    let mut view = TerminalView::stdout(&profile.display_name);
    view.render_conversation(session);
    Ok(())
}

/// `chatmosphere delete <id>`
pub fn run_delete(config: &Config, id: &str) -> anyhow::Result<()> {
    let id: SessionId = id.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let (mut store, _) = open_store(config);
    if store.find_by_id(id).is_none() {
        eprintln!("No chat with id {id}; nothing to delete.");
        return Ok(());
    }
    store.delete_session(id);
    eprintln!("Deleted {id}");
    Ok(())
}

/// `chatmosphere profile [--name N] [--avatar URI | --clear-avatar]`
pub fn run_profile(
    config: &Config,
    name: Option<&str>,
    avatar: Option<&str>,
    clear_avatar: bool,
) -> anyhow::Result<()> {
    let (mut store, mut profile) = open_store(config);

    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        store.switch_identity(name)?;
        profile.display_name = name.to_string();
    }
    if clear_avatar {
        profile.set_avatar(store.storage_mut(), None)?;
    } else if let Some(uri) = avatar {
        profile.set_avatar(store.storage_mut(), Some(uri.to_string()))?;
    }

    println!("Display name: {}", profile.display_name);
    println!(
        "Avatar:       {}",
        profile.avatar.as_deref().unwrap_or("(none)")
    );
    println!("Saved chats:  {}", store.all_sessions().len());
    Ok(())
}
