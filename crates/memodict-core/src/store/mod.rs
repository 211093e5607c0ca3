mod config;
pub mod collection;
pub mod word_db;

pub use collection::{AddOutcome, Collection, ImportSummary, SortKey};
pub use config::{Config, RemoteConfig, SyncConfig};
pub use word_db::WordDb;

use std::path::PathBuf;

/// Returns `~/.config/memodict[-dev]/` based on MEMODICT_ENV.
///
/// Set MEMODICT_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MEMODICT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("memodict-dev")
    } else {
        base_dir.join("memodict")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
