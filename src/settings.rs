use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FinsenseError, Result};

/// Overrides the config directory. Used by the CLI tests to stay hermetic.
pub const CONFIG_DIR_ENV: &str = "FINSENSE_CONFIG_DIR";

pub const DB_FILE: &str = "finsense.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Remote canister endpoint. Only the local store is available in this build.
    #[serde(default)]
    pub canister_url: Option<String>,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            user_name: String::new(),
            currency_symbol: default_currency_symbol(),
            canister_url: None,
        }
    }
}

fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("finsense")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("finsense")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Could not read {}: {e}; using defaults", path.display());
            return Settings::default();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        log::warn!("Malformed settings at {}: {e}; using defaults", path.display());
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FinsenseError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join(DB_FILE)
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
            user_name: "Asha".to_string(),
            currency_symbol: "$".to_string(),
            canister_url: None,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.user_name, "Asha");
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.currency_symbol, "$");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.user_name.is_empty());
        assert_eq!(s.currency_symbol, "₹");
        assert!(s.canister_url.is_none());
        assert!(s.data_dir.ends_with("finsense"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "user_name": "Ravi"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.currency_symbol, "₹");
        assert_eq!(s.user_name, "Ravi");
        assert!(s.canister_url.is_none());
    }

    #[test]
    fn test_shellexpand_keeps_missing_paths() {
        let expanded = shellexpand_path("/definitely/not/here");
        assert_eq!(expanded, "/definitely/not/here");
    }
}
