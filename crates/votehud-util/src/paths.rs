//! Default paths for votehud
//!
//! The preferences file is user-writable (no root required):
//! - `$VOTEHUD_CONFIG` if set
//! - `$XDG_CONFIG_HOME/votehud/votehud.json`
//! - `~/.config/votehud/votehud.json`

use std::path::PathBuf;

/// Environment variable for overriding the preferences file path
pub const VOTEHUD_CONFIG_ENV: &str = "VOTEHUD_CONFIG";

/// Preferences filename within the config directory
const CONFIG_FILENAME: &str = "votehud.json";

/// Application subdirectory name
const APP_DIR: &str = "votehud";

/// Get the default preferences file path.
///
/// Order of precedence:
/// 1. `$VOTEHUD_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/votehud/votehud.json` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/votehud/votehud.json` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(VOTEHUD_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the preferences path without checking the VOTEHUD_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    config_dir_without_env().join(CONFIG_FILENAME)
}

fn config_dir_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_contains_votehud() {
        let path = config_path_without_env();
        assert!(path.to_string_lossy().contains("votehud"));
        assert!(path.to_string_lossy().ends_with("votehud.json"));
    }

    #[test]
    fn config_path_has_parent_dir() {
        let path = config_path_without_env();
        assert!(path.parent().is_some());
    }
}
