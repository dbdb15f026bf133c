// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file.

use serde::{Deserialize, Serialize};
use tracing::warn;

pub(crate) const CONFIG_NAME: &str = "showreel";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    /// Whose playlist to play when none is given on the command line.
    pub owner_id: String,
    pub database_file: String,
    pub log_file: String,
    /// Pause between an item ending and the next one appearing.
    pub settle_delay_ms: u64,
    /// How long a slide presentation stays up.
    pub slide_duration_secs: u64,
    pub loop_enabled: bool,
    pub autoplay: bool,
    /// Ask the terminal to go fullscreen while something plays.
    pub display_control: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            owner_id: "default".to_string(),
            database_file: "showreel.db".to_string(),
            log_file: "showreel.log".to_string(),
            settle_delay_ms: 300,
            slide_duration_secs: 30,
            loop_enabled: true,
            autoplay: true,
            display_control: true,
        }
    }
}

/// A configuration that could not be read and was replaced by defaults.
#[derive(Debug)]
pub struct ConfigFallback {
    name: String,
    error: confy::ConfyError,
}

impl ConfigFallback {
    /// Reports the fallback. Only useful once logging is up.
    pub fn log(&self) {
        warn!("Using default configuration, could not load '{}': {}", self.name, self.error);
    }
}

/// Loads the named configuration, falling back to defaults if it is missing
/// or unreadable.
///
/// Logging is configured from the result, so a fallback is handed back to be
/// reported rather than logged here.
pub fn load_config(name: Option<&str>) -> (AppConfig, Option<ConfigFallback>) {
    let name = name.unwrap_or(CONFIG_NAME);
    or_default(name, confy::load(name, None))
}

fn or_default(name: &str, loaded: Result<AppConfig, confy::ConfyError>) -> (AppConfig, Option<ConfigFallback>) {
    match loaded {
        Ok(config) => (config, None),
        Err(error) => (
            AppConfig::default(),
            Some(ConfigFallback {
                name: name.to_string(),
                error,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackSettings;
    use std::time::Duration;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"owner_id":"lobby","loop_enabled":false}"#).unwrap();

        assert_eq!(config.owner_id, "lobby");
        assert!(!config.loop_enabled);
        assert_eq!(config.slide_duration_secs, 30);
        assert_eq!(config.database_file, "showreel.db");
    }

    #[test]
    fn test_playback_settings_from_config() {
        let config = AppConfig {
            settle_delay_ms: 0,
            slide_duration_secs: 0,
            ..AppConfig::default()
        };

        let settings = PlaybackSettings::from(&config);

        assert_eq!(settings.settle_delay, Duration::ZERO);
        assert_eq!(settings.slide_duration_secs, 1);
        assert!(settings.autoplay);
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("showreel-broken-{}.toml", std::process::id()));
        std::fs::write(&path, "owner_id = = \"lobby\"\n").unwrap();

        let (config, fallback) = or_default("broken", confy::load_path(&path));
        std::fs::remove_file(&path).ok();

        assert_eq!(config, AppConfig::default());
        let fallback = fallback.unwrap();
        assert_eq!(fallback.name, "broken");
    }

    #[test]
    fn test_readable_config_has_no_fallback() {
        let path = std::env::temp_dir().join(format!("showreel-lobby-{}.toml", std::process::id()));
        std::fs::write(&path, "owner_id = \"lobby\"\n").unwrap();

        let (config, fallback) = or_default("lobby", confy::load_path(&path));
        std::fs::remove_file(&path).ok();

        assert_eq!(config.owner_id, "lobby");
        assert!(fallback.is_none());
    }
}
