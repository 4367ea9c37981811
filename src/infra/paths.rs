// src/infra/paths.rs — Config and data locations
//
// All paths respect the CHATMOSPHERE_HOME environment variable for isolation.
// When CHATMOSPHERE_HOME is set, config and data live under that directory.
// When unset, config uses ~/.chatmosphere/ and data uses XDG_DATA_HOME/chatmosphere.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the CHATMOSPHERE_HOME override, if set.
fn chatmosphere_home() -> Option<PathBuf> {
    std::env::var_os("CHATMOSPHERE_HOME").map(PathBuf::from)
}

/// Home directory, or the current directory when none can be determined.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $CHATMOSPHERE_HOME/ or ~/.chatmosphere/
pub fn config_dir() -> PathBuf {
    if let Some(home) = chatmosphere_home() {
        return home;
    }
    dirs_home().join(".chatmosphere")
}

/// Data directory: $CHATMOSPHERE_HOME/data/ or ~/.local/share/chatmosphere/
pub fn data_dir() -> PathBuf {
    if let Some(home) = chatmosphere_home() {
        return home.join("data");
    }
    match ProjectDirs::from("", "", "chatmosphere") {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        None => config_dir().join("data"),
    }
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Key-value storage file holding profile and chat history.
pub fn storage_path() -> PathBuf {
    data_dir().join("storage.json")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    for dir in [config_dir(), data_dir()] {
        tokio::fs::create_dir_all(&dir).await?;
    }
    Ok(())
}
