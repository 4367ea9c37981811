// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;
pub mod history;
pub mod serve;
pub mod view;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chatmosphere",
    about = "Chat relay for hosted LLMs, with a terminal client",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Relay URL for client commands (overrides [client].relay_url)
    #[arg(long, global = true)]
    pub relay: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay server (POST /chat plus the web client)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory holding index.html and assets
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Interactive chat session (default)
    Chat,
    /// List saved chats (last 24 hours unless --all)
    History {
        #[arg(long)]
        all: bool,
    },
    /// Search saved chats
    Search {
        #[arg(trailing_var_arg = true)]
        keyword: Vec<String>,
    },
    /// Print one saved chat
    Show {
        /// Chat id, e.g. chat_1760000000000
        id: String,
    },
    /// Delete a saved chat
    Delete {
        /// Chat id, e.g. chat_1760000000000
        id: String,
    },
    /// Show or change the display name and avatar
    Profile {
        /// Switch to another display name (each name has its own history)
        #[arg(long)]
        name: Option<String>,
        /// Avatar image reference (data URI or URL)
        #[arg(long, conflicts_with = "clear_avatar")]
        avatar: Option<String>,
        /// Remove the avatar
        #[arg(long)]
        clear_avatar: bool,
    },
}

impl Commands {
    pub fn is_server(&self) -> bool {
        matches!(self, Commands::Serve { .. })
    }
}
