use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

static CONFIG_FILE: &str = "config.toml";

/// Per-user config path: `$HOME/.config/kelas/config.toml` on unix,
/// `%APPDATA%\kelas\config.toml` on windows.
pub fn user_config_file() -> Option<PathBuf> {
    #[cfg(unix)]
    let base = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
    #[cfg(windows)]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let base: Option<PathBuf> = None;

    base.map(|path| path.join(crate::APPLICATION_NAME).join(CONFIG_FILE))
}

pub fn find_config_file(use_local: bool) -> PathBuf {
    let local = PathBuf::from("./").join(CONFIG_FILE);
    if use_local {
        return local;
    }

    match user_config_file() {
        Some(path) if path.exists() => path,
        _ => local,
    }
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let filename = find_config_file(use_local);

    tracing::trace!("looking for config at: {}", filename.display());
    read_config_at(&filename)
}

pub fn read_config_at(filename: &Path) -> ConfigResult<Vec<u8>> {
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound(filename.to_path_buf()));
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    Ok(std::fs::read(filename)?)
}
