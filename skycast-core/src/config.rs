use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://weather.visualcrossing.com";
pub const DEFAULT_UNIT_GROUP: &str = "us";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding [`Config::api_key`].
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";
/// Environment variable overriding [`Config::db_path`].
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit_group = "metric"
/// timeout_secs = 5
/// db_path = "/var/lib/skycast/users.db"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Visual Crossing API key.
    pub api_key: Option<String>,
    pub base_url: String,
    /// `us`, `metric`, `uk` or `base`.
    pub unit_group: String,
    pub timeout_secs: u64,
    /// SQLite file holding user accounts. Falls back to the platform data dir.
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            unit_group: DEFAULT_UNIT_GROUP.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            db_path: None,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            // First run: no config file, return empty.
            Self::default()
        };

        cfg.apply_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Apply `WEATHER_API_KEY` / `DB_PATH` style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(path) = lookup(DB_PATH_ENV).filter(|v| !v.is_empty()) {
            self.db_path = Some(PathBuf::from(path));
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Resolved path of the user database.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("users.db")),
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn is_api_key_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_visual_crossing() {
        let cfg = Config::default();

        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.unit_group, "us");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert!(!cfg.is_api_key_configured());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("api_key = \"ABC\"\ntimeout_secs = 3\n").unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("ABC"));
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(cfg.db_path.is_none());
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cfg = Config { timeout_secs: 0, ..Config::default() };
        assert_eq!(cfg.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> =
            [(API_KEY_ENV, "FROM_ENV"), (DB_PATH_ENV, "/tmp/users.db")].into_iter().collect();

        let mut cfg = Config { api_key: Some("FROM_FILE".into()), ..Config::default() };
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api_key.as_deref(), Some("FROM_ENV"));
        assert_eq!(cfg.db_path().unwrap(), PathBuf::from("/tmp/users.db"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config { api_key: Some("FROM_FILE".into()), ..Config::default() };
        cfg.apply_overrides(|_| Some(String::new()));

        assert_eq!(cfg.api_key.as_deref(), Some("FROM_FILE"));
    }

    #[test]
    fn set_api_key_marks_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        assert!(cfg.is_api_key_configured());
    }

    #[test]
    fn toml_roundtrip_keeps_db_path() {
        let cfg = Config { db_path: Some(PathBuf::from("/data/users.db")), ..Config::default() };
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.db_path, cfg.db_path);
    }
}
