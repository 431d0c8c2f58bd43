//! User configuration.
//!
//! Loaded from `config.json` in the working directory, or from
//! `~/.config/winshift/config.json`. Missing keys fall back to defaults
//! thanks to `#[serde(default)]`; unknown keys are ignored.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::hotkey::{HotkeyAction, KeyCombo, RestartPolicy};
use crate::log::LogConfig;
use crate::placer::PlacementPolicy;
use crate::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.json";

/// Top-level configuration.
///
/// Treated as an immutable snapshot. A reload builds a new `Config`
/// and swaps it in whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hotkey that arranges windows (e.g. "ctrl+alt+i").
    pub hotkey: String,
    /// Hotkey that stops the process.
    pub exit_hotkey: String,
    /// Hotkey that reloads this file and re-registers hotkeys.
    pub reload_hotkey: String,
    /// Patterns for windows sent to the secondary monitor.
    pub monitor_1_apps: Vec<String>,
    /// Patterns for windows sent to the primary monitor.
    pub monitor_2_apps: Vec<String>,
    /// Seconds between hotkey health checks.
    pub hotkey_test_interval: u64,
    /// Whether health checks may re-register hotkeys.
    pub enable_auto_restart: bool,
    /// Consecutive failed re-registrations before health checks give up.
    pub max_restart_attempts: u32,
    /// Seconds a raw key stays in the recovery history.
    pub auto_recovery_timeout: u64,
    /// Whether raw key bursts trigger hotkey re-registration.
    pub enable_auto_recovery: bool,
    /// Minimum log level: "debug", "info", "warning", or "error".
    pub log_level: String,
    /// Also write logs to `~/.config/winshift/logs/winshift.log`.
    pub log_file: bool,
    /// Distance in pixels from the monitor corner for moved windows.
    pub placement_offset: i32,
    /// Wait after restoring a maximized window, in milliseconds.
    pub restore_settle_ms: u64,
    /// Wait before re-maximizing a moved window, in milliseconds.
    pub maximize_settle_ms: u64,
    /// Pause between two windows of one pass, in milliseconds.
    pub window_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkey: "ctrl+alt+i".into(),
            exit_hotkey: "ctrl+alt+q".into(),
            reload_hotkey: "ctrl+alt+r".into(),
            monitor_1_apps: vec!["opera".into(), "RD Tabs".into()],
            monitor_2_apps: vec!["*".into()],
            hotkey_test_interval: 1800,
            enable_auto_restart: true,
            max_restart_attempts: 3,
            auto_recovery_timeout: 5,
            enable_auto_recovery: true,
            log_level: "INFO".into(),
            log_file: false,
            placement_offset: 100,
            restore_settle_ms: 100,
            maximize_settle_ms: 200,
            window_delay_ms: 100,
        }
    }
}

impl Config {
    /// Clamps numeric values to safe ranges.
    ///
    /// A zero interval would turn the health check into a busy loop, and
    /// a huge offset would push windows off screen.
    pub fn validate(&mut self) {
        self.hotkey_test_interval = self.hotkey_test_interval.max(1);
        self.auto_recovery_timeout = self.auto_recovery_timeout.clamp(1, 3600);
        self.max_restart_attempts = self.max_restart_attempts.max(1);
        self.placement_offset = self.placement_offset.clamp(0, 1000);
        self.restore_settle_ms = self.restore_settle_ms.min(5000);
        self.maximize_settle_ms = self.maximize_settle_ms.min(5000);
        self.window_delay_ms = self.window_delay_ms.min(5000);
    }

    /// Parses the three hotkey strings, in registration order.
    pub fn hotkeys(&self) -> Result<[(HotkeyAction, KeyCombo); 3]> {
        Ok([
            (HotkeyAction::Arrange, self.hotkey.parse()?),
            (HotkeyAction::Exit, self.exit_hotkey.parse()?),
            (HotkeyAction::Reload, self.reload_hotkey.parse()?),
        ])
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.hotkey_test_interval)
    }

    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_secs(self.auto_recovery_timeout)
    }

    pub fn placement_policy(&self) -> PlacementPolicy {
        PlacementPolicy {
            offset: self.placement_offset,
            restore_settle: Duration::from_millis(self.restore_settle_ms),
            maximize_settle: Duration::from_millis(self.maximize_settle_ms),
        }
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        RestartPolicy {
            enabled: self.enable_auto_restart,
            max_attempts: self.max_restart_attempts,
        }
    }

    pub fn window_delay(&self) -> Duration {
        Duration::from_millis(self.window_delay_ms)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            file: self.log_file,
            ..LogConfig::default()
        }
    }
}

/// Returns the per-user config directory: `~/.config/winshift/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("winshift"))
}

/// Returns the config file to read.
///
/// `./config.json` wins over the per-user file when it exists. When
/// neither exists, the per-user path is returned so messages can point
/// at it.
pub fn config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Parses a config document and clamps it.
pub fn parse(content: &str) -> Result<Config> {
    let mut config: Config =
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
    config.validate();
    Ok(config)
}

/// Renders the default config as pretty-printed JSON for `winshift init`.
pub fn default_document() -> Result<String> {
    serde_json::to_string_pretty(&Config::default()).map_err(|e| Error::Config(e.to_string()))
}

/// Tries to load and parse the config file.
pub fn try_load() -> Result<Config> {
    let path = config_path().ok_or(Error::Config("could not determine config path".into()))?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    parse(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Loads the configuration, falling back to defaults.
///
/// A missing file silently yields defaults; a file that fails to parse
/// is reported and also yields defaults.
pub fn load() -> Config {
    let exists = config_path().is_some_and(|p| p.is_file());
    if !exists {
        crate::log_info!("No config file found, using defaults");
        return Config::default();
    }
    match try_load() {
        Ok(config) => config,
        Err(e) => {
            crate::log_warn!("{e}, using defaults");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        // Act
        let config = Config::default();

        // Assert
        assert_eq!(config.hotkey, "ctrl+alt+i");
        assert_eq!(config.monitor_1_apps, vec!["opera", "RD Tabs"]);
        assert_eq!(config.monitor_2_apps, vec!["*"]);
        assert_eq!(config.hotkey_test_interval, 1800);
        assert_eq!(config.auto_recovery_timeout, 5);
        assert!(config.enable_auto_recovery);
    }

    #[test]
    fn partial_json_uses_defaults_for_missing_keys() {
        // Arrange
        let json = r#"{ "hotkey": "ctrl+shift+m", "monitor_1_apps": ["teams"] }"#;

        // Act
        let config = parse(json).unwrap();

        // Assert
        assert_eq!(config.hotkey, "ctrl+shift+m");
        assert_eq!(config.monitor_1_apps, vec!["teams"]);
        assert_eq!(config.exit_hotkey, "ctrl+alt+q");
        assert_eq!(config.monitor_2_apps, vec!["*"]);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        // Arrange
        let json = r#"{ "theme": "dark", "log_level": "DEBUG" }"#;

        // Act
        let config = parse(json).unwrap();

        // Assert
        assert_eq!(config.log_level, "DEBUG");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        // Act
        let result = parse("{ \"hotkey\": ");

        // Assert
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn validate_clamps_extreme_values() {
        // Arrange
        let mut config = Config {
            hotkey_test_interval: 0,
            auto_recovery_timeout: 0,
            max_restart_attempts: 0,
            placement_offset: -40,
            maximize_settle_ms: 60_000,
            ..Config::default()
        };

        // Act
        config.validate();

        // Assert
        assert_eq!(config.hotkey_test_interval, 1);
        assert_eq!(config.auto_recovery_timeout, 1);
        assert_eq!(config.max_restart_attempts, 1);
        assert_eq!(config.placement_offset, 0);
        assert_eq!(config.maximize_settle_ms, 5000);
    }

    #[test]
    fn hotkeys_parse_in_registration_order() {
        // Act
        let hotkeys = Config::default().hotkeys().unwrap();

        // Assert
        let actions: Vec<_> = hotkeys.iter().map(|(a, _)| *a).collect();
        assert_eq!(
            actions,
            [HotkeyAction::Arrange, HotkeyAction::Exit, HotkeyAction::Reload]
        );
        assert_eq!(hotkeys[1].1.key, "q");
    }

    #[test]
    fn invalid_hotkey_is_reported() {
        // Arrange
        let config = Config {
            reload_hotkey: "ctrl+hyper+r".into(),
            ..Config::default()
        };

        // Act / Assert
        assert!(matches!(
            config.hotkeys(),
            Err(Error::InvalidHotkey { .. })
        ));
    }

    #[test]
    fn default_document_parses_back_to_defaults() {
        // Act
        let document = default_document().unwrap();

        // Assert
        assert!(document.contains("\"monitor_1_apps\""));
        assert_eq!(parse(&document).unwrap(), Config::default());
    }

    #[test]
    fn placement_policy_converts_milliseconds() {
        // Act
        let policy = Config::default().placement_policy();

        // Assert
        assert_eq!(policy.offset, 100);
        assert_eq!(policy.restore_settle, Duration::from_millis(100));
        assert_eq!(policy.maximize_settle, Duration::from_millis(200));
    }
}
