use crate::kernel::services::ports::config::SearchSettings;
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".zfind";
const SETTINGS_FILE: &str = "settings.json";

pub fn get_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

pub fn parse_settings(data: &str) -> serde_json::Result<SearchSettings> {
    serde_json::from_str(data)
}

/// Missing or malformed files fall back to defaults.
pub fn load_settings_from(path: &Path) -> SearchSettings {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => return SearchSettings::default(),
    };
    match parse_settings(&data) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
            SearchSettings::default()
        }
    }
}

pub fn load_settings() -> SearchSettings {
    match get_settings_path() {
        Some(path) => load_settings_from(&path),
        None => SearchSettings::default(),
    }
}

fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config"));
    }

    #[cfg(target_os = "windows")]
    {
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
