use std::fs;
use std::path::PathBuf;

use crate::auth::FileTokenStore;
use crate::config::config;

/// Directory holding the CLI's persisted session.
///
/// `FERRETERIA_CLI_CONFIG_DIR` wins, otherwise `~/.config/ferre/cli`.
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = match &config().session.store_dir {
        Some(dir) => dir.clone(),
        None => {
            let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("ferre").join("cli")
        }
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn token_store() -> anyhow::Result<FileTokenStore> {
    Ok(FileTokenStore::in_dir(&get_config_dir()?))
}
