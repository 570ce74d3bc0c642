use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::upload::{DEFAULT_SUCCESS_DISPLAY, DEFAULT_UPLOAD_DELAY};

pub const DATASET_FILE: &str = "sampledata.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    /// URL or path of the record feed. Empty means `<data_dir>/sampledata.json`.
    #[serde(default)]
    pub data_source: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default = "default_upload_delay_ms")]
    pub upload_delay_ms: u64,
    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,
}

fn default_upload_delay_ms() -> u64 {
    DEFAULT_UPLOAD_DELAY.as_millis() as u64
}

fn default_success_display_ms() -> u64 {
    DEFAULT_SUCCESS_DISPLAY.as_millis() as u64
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            data_source: String::new(),
            user_name: String::new(),
            upload_delay_ms: default_upload_delay_ms(),
            success_display_ms: default_success_display_ms(),
        }
    }
}

impl Settings {
    /// The feed to load: an explicit override, the configured source, or the
    /// dataset file inside the data directory.
    pub fn resolve_source(&self, override_source: Option<&str>) -> String {
        if let Some(src) = override_source.filter(|s| !s.is_empty()) {
            return src.to_string();
        }
        if !self.data_source.is_empty() {
            return self.data_source.clone();
        }
        PathBuf::from(&self.data_dir)
            .join(DATASET_FILE)
            .to_string_lossy()
            .to_string()
    }

    pub fn upload_delay(&self) -> Duration {
        Duration::from_millis(self.upload_delay_ms)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("reviewdesk")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("reviewdesk.log")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("reviewdesk")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable {}: {e}", path.display());
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DeskError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            data_source: "https://example.com/sampledata.json".to_string(),
            user_name: "Avery".to_string(),
            upload_delay_ms: 500,
            success_display_ms: 750,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.user_name, "Avery");
        assert_eq!(loaded.data_source, "https://example.com/sampledata.json");
        assert_eq!(loaded.upload_delay(), Duration::from_millis(500));
        assert_eq!(loaded.success_display(), Duration::from_millis(750));
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.user_name.is_empty());
        assert!(s.data_source.is_empty());
        assert_eq!(s.upload_delay_ms, 2000);
        assert_eq!(s.success_display_ms, 3000);
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "user_name": "Bob"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.upload_delay_ms, 2000);
        assert_eq!(s.user_name, "Bob");
        assert!(s.data_source.is_empty());
    }

    #[test]
    fn test_resolve_source_precedence() {
        let mut s = Settings {
            data_dir: "/data".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            PathBuf::from(s.resolve_source(None)),
            PathBuf::from("/data").join(DATASET_FILE)
        );
        s.data_source = "https://example.com/feed.json".to_string();
        assert_eq!(s.resolve_source(None), "https://example.com/feed.json");
        assert_eq!(s.resolve_source(Some("local.json")), "local.json");
        assert_eq!(s.resolve_source(Some("")), "https://example.com/feed.json");
    }
}
