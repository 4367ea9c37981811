// src/main.rs — Chátmosphere entry point

use clap::Parser;

use chatmosphere::cli::{Cli, Commands};
use chatmosphere::infra::config::Config;
use chatmosphere::infra::{logger, paths};

#[tokio::main]
async fn main() {
    // Provider keys may live in a .env next to the relay
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // The relay logs requests; the chat client stays quiet unless asked
    let level = match &cli.command {
        Some(cmd) if cmd.is_server() => "info",
        _ => "warn",
    };
    logger::init_logging(level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    if let Some(relay) = cli.relay {
        config.client.relay_url = relay;
    }

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            static_dir,
        }) => chatmosphere::cli::serve::run_serve(&config, host, port, static_dir).await,
        Some(Commands::History { all }) => chatmosphere::cli::history::run_history(&config, all),
        Some(Commands::Search { keyword }) => {
            chatmosphere::cli::history::run_search(&config, &keyword.join(" "))
        }
        Some(Commands::Show { id }) => chatmosphere::cli::history::run_show(&config, &id),
        Some(Commands::Delete { id }) => chatmosphere::cli::history::run_delete(&config, &id),
        Some(Commands::Profile {
            name,
            avatar,
            clear_avatar,
        }) => chatmosphere::cli::history::run_profile(
            &config,
            name.as_deref(),
            avatar.as_deref(),
            clear_avatar,
        ),
        Some(Commands::Chat) | None => {
            if config.client.storage_path.is_none() {
                paths::ensure_dirs().await?;
            }
            chatmosphere::cli::chat::run_chat(&config).await
        }
    }
}
