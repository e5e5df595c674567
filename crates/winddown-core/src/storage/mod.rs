mod config;

pub use config::Config;

use std::path::PathBuf;

/// Returns `~/.config/winddown[-dev]/` based on WINDDOWN_ENV.
///
/// Set WINDDOWN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WINDDOWN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("winddown-dev")
    } else {
        base_dir.join("winddown")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
